mod formatter;

pub use formatter::{
    format_breakdown_table, format_headline, format_score_bar, format_summary, format_value,
    should_use_colors, to_json,
};
