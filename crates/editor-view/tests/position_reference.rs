//! Randomized position conversion checked against a rope reference implementation.
//!
//! The rope indexes by `char`; its UTF-16 helpers give the expected coordinates for every char
//! boundary of a random document.

use editor_view::{document_len, offset_to_position, position_to_offset, split_lines};
use rand::Rng;
use ropey::Rope;

fn random_text(rng: &mut impl Rng, chars: usize) -> String {
    (0..chars)
        .map(|_| match rng.gen_range(0..10) {
            0 => '\n',
            1 => '你',
            2 => '👋',
            3 => 'é',
            _ => char::from(b'a' + rng.gen_range(0..26u8)),
        })
        .collect()
}

#[test]
fn test_offsets_match_rope_reference() {
    let mut rng = rand::thread_rng();

    for _ in 0..50 {
        let chars = rng.gen_range(0..400);
        let text = random_text(&mut rng, chars);
        let lines = split_lines(&text);
        let rope = Rope::from_str(&text);

        assert_eq!(document_len(&lines) as usize, rope.len_utf16_cu());
        assert_eq!(lines.len(), rope.len_lines());

        for _ in 0..100 {
            let char_idx = rng.gen_range(0..=rope.len_chars());
            let offset = rope.char_to_utf16_cu(char_idx);
            let line = rope.char_to_line(char_idx);
            let line_start = rope.char_to_utf16_cu(rope.line_to_char(line));
            let column = offset - line_start;

            let pos = offset_to_position(offset as u32, &lines);
            assert_eq!(
                (pos.line as usize, pos.column as usize, pos.offset as usize),
                (line, column, offset),
                "text {text:?}, char {char_idx}"
            );
            assert_eq!(
                position_to_offset(line as u32, column as u32, &lines) as usize,
                offset
            );
        }
    }
}

#[test]
fn test_out_of_range_offsets_clamp_to_end() {
    let mut rng = rand::thread_rng();
    let text = random_text(&mut rng, 200);
    let lines = split_lines(&text);
    let rope = Rope::from_str(&text);

    let end = rope.len_utf16_cu() as u32;
    let pos = offset_to_position(end + rng.gen_range(1..1_000), &lines);
    assert_eq!(pos.offset, end);
    assert_eq!(pos.line as usize, rope.len_lines() - 1);
}
