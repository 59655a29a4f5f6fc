/// Confidence of a table-to-question binding, in `[0, 1]`.
pub fn score_table_match(keyword_hits: usize, shared_substrings: usize, table_cells: usize) -> f32 {
    let mut score = 0.0;
    if keyword_hits >= 2 {
        score += 0.4;
        score += 0.05 * (keyword_hits - 2).min(4) as f32;
    }

    if shared_substrings >= 3 {
        score += 0.3;
    }

    if table_cells > 0 {
        let coverage = shared_substrings as f32 / table_cells as f32;
        if coverage >= 0.5 {
            score += 0.2;
        } else if coverage >= 0.2 {
            score += 0.1;
        }
    }

    score.clamp(0.0, 1.0)
}
