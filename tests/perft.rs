/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tadpole::{perft, splitperft, Position, FEN_KIWIPETE, FEN_STARTPOS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let mut position = Position::from_fen(fen).unwrap();
    let res = perft(&mut position, depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
    assert_eq!(position, Position::from_fen(fen).unwrap(), "perft must restore the position");
}

// Startpos
#[test]
fn test_startpos_perft() {
    test_perft_fen_nodes(1, FEN_STARTPOS, 20);
    test_perft_fen_nodes(2, FEN_STARTPOS, 400);
    test_perft_fen_nodes(3, FEN_STARTPOS, 8_902);
}

// https://www.chessprogramming.org/Perft_Results#Position_2
#[test]
fn test_kiwipete_perft() {
    test_perft_fen_nodes(1, FEN_KIWIPETE, 48);
    test_perft_fen_nodes(2, FEN_KIWIPETE, 2_039);
    test_perft_fen_nodes(3, FEN_KIWIPETE, 97_862);
}

// https://www.chessprogramming.org/Perft_Results#Position_3
#[test]
fn test_position_3_perft() {
    let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    test_perft_fen_nodes(1, fen, 14);
    test_perft_fen_nodes(2, fen, 191);
    test_perft_fen_nodes(3, fen, 2_812);
}

// https://www.chessprogramming.org/Perft_Results#Position_4
#[test]
fn test_position_4_perft() {
    let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    test_perft_fen_nodes(1, fen, 6);
    test_perft_fen_nodes(2, fen, 264);
    test_perft_fen_nodes(3, fen, 9_467);
}

// https://www.chessprogramming.org/Perft_Results#Position_5
#[test]
fn test_position_5_perft() {
    let fen = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
    test_perft_fen_nodes(1, fen, 44);
    test_perft_fen_nodes(2, fen, 1_486);
    test_perft_fen_nodes(3, fen, 62_379);
}

// Promotions on both sides
#[test]
fn test_promotions_perft() {
    let fen = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";
    test_perft_fen_nodes(1, fen, 24);
    test_perft_fen_nodes(2, fen, 496);
    test_perft_fen_nodes(3, fen, 9_483);
}

#[test]
fn test_splitperft_matches_perft() {
    let mut position = Position::from_fen(FEN_KIWIPETE).unwrap();
    assert_eq!(splitperft(&mut position, 2), perft(&mut position, 2));
}
