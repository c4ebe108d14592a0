//! Plain terminal rendering of an [`AnnualSummary`].
//!
//! The report is built as a list of colored segments first and written out in
//! a second step, so the layout can be checked without a terminal.

use crate::format::{format_days, format_number, format_number_full};
use crate::summary::{AnnualSummary, WEEKDAY_NAMES};
use crate::theme::ThemeColors;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LABEL_WIDTH: usize = 16;
const NAME_WIDTH: usize = 24;
const BAR_WIDTH: usize = 28;

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub color: Option<Color>,
    pub bold: bool,
}

impl Segment {
    fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

pub type ReportLine = Vec<Segment>;

/// Text of a line with styling dropped.
pub fn line_text(line: &[Segment]) -> String {
    line.iter().map(|s| s.text.as_str()).collect()
}

/// Pad to `width` display columns, truncating with an ellipsis when wider.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let current = s.width();
    if current <= width {
        let mut out = String::with_capacity(s.len() + width - current);
        out.push_str(s);
        out.extend(std::iter::repeat(' ').take(width - current));
        return out;
    }

    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::with_capacity(width + 3);
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    if width > 0 {
        out.push('…');
        used += 1;
    }
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

/// Horizontal bar scaled against `max`; any non-zero count shows at least one cell.
pub fn bar(count: u64, max: u64, width: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let cells = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

fn stat_line(label: &str, value: String, color: Color, colors: &ThemeColors) -> ReportLine {
    vec![
        Segment::colored(format!("  {}", pad_to_width(label, LABEL_WIDTH)), colors.text_muted),
        Segment::colored(value, color).bold(),
    ]
}

fn heading(title: &str, colors: &ThemeColors) -> ReportLine {
    vec![Segment::colored(title.to_string(), colors.title).bold()]
}

fn ranked_line(
    index: usize,
    name: &str,
    detail: Option<&str>,
    count: u64,
    percentage: f64,
    colors: &ThemeColors,
) -> ReportLine {
    let mut line = vec![
        Segment::colored(format!("  {}. ", index + 1), colors.text_muted),
        Segment::colored(pad_to_width(name, NAME_WIDTH), colors.rank_color(index)),
    ];
    if let Some(detail) = detail {
        line.push(Segment::colored(
            format!(" {}", pad_to_width(detail, 12)),
            colors.text_muted,
        ));
    }
    line.push(Segment::colored(
        format!(" {:>8}", format_number_full(count)),
        colors.text_primary,
    ));
    line.push(Segment::colored(
        format!(" {:>5.1}%", percentage),
        colors.text_muted,
    ));
    line
}

/// Lay out the whole report.
pub fn build_report(summary: &AnnualSummary, colors: &ThemeColors) -> Vec<ReportLine> {
    let mut lines: Vec<ReportLine> = Vec::with_capacity(48);
    let title = format!(" Neovate Wrapped {} ", summary.year);
    let rule = "─".repeat(title.width());

    lines.push(vec![Segment::colored(format!("╭{}╮", rule), colors.border)]);
    lines.push(vec![
        Segment::colored("│", colors.border),
        Segment::colored(title, colors.title).bold(),
        Segment::colored("│", colors.border),
    ]);
    lines.push(vec![Segment::colored(format!("╰{}╯", rule), colors.border)]);

    if let Some(first) = summary.first_session_date {
        lines.push(vec![Segment::colored(
            format!(
                "  Coding with Neovate since {} ({} ago)",
                first.format("%b %-d, %Y"),
                format_days(summary.days_since_first_session.max(0) as u32)
            ),
            colors.text_muted,
        )]);
    }
    lines.push(Vec::new());

    lines.push(heading("Activity", colors));
    lines.push(stat_line(
        "Sessions",
        format_number_full(summary.total_sessions),
        colors.text_primary,
        colors,
    ));
    lines.push(stat_line(
        "Messages",
        format_number_full(summary.total_messages),
        colors.text_primary,
        colors,
    ));
    lines.push(stat_line(
        "Projects",
        format_number_full(summary.total_projects),
        colors.text_primary,
        colors,
    ));
    lines.push(stat_line(
        "Tool calls",
        format_number_full(summary.total_tool_calls),
        colors.text_primary,
        colors,
    ));
    let mut tokens = stat_line(
        "Tokens",
        format_number(summary.total_tokens),
        colors.accent_yellow,
        colors,
    );
    tokens.push(Segment::colored(" (", colors.text_muted));
    tokens.push(Segment::colored(
        format!("{} in", format_number(summary.total_input_tokens)),
        colors.token_input(),
    ));
    tokens.push(Segment::colored(" / ", colors.text_muted));
    tokens.push(Segment::colored(
        format!("{} out", format_number(summary.total_output_tokens)),
        colors.token_output(),
    ));
    tokens.push(Segment::colored(")", colors.text_muted));
    lines.push(tokens);
    lines.push(Vec::new());

    lines.push(heading("Streaks", colors));
    let mut longest = stat_line(
        "Longest streak",
        format_days(summary.max_streak),
        colors.streak(),
        colors,
    );
    if let (Some(start), Some(end)) = (summary.max_streak_days.first(), summary.max_streak_days.last()) {
        longest.push(Segment::colored(
            format!(" ({} to {})", start.format("%b %-d"), end.format("%b %-d")),
            colors.text_muted,
        ));
    }
    lines.push(longest);
    lines.push(stat_line(
        "Current streak",
        format_days(summary.current_streak),
        colors.streak(),
        colors,
    ));
    if let Some(day) = &summary.most_active_day {
        let mut busiest = stat_line(
            "Busiest day",
            day.formatted_date.clone(),
            colors.accent_green,
            colors,
        );
        busiest.push(Segment::colored(
            format!(" ({} messages)", format_number_full(day.count)),
            colors.text_muted,
        ));
        lines.push(busiest);
    }
    lines.push(Vec::new());

    if !summary.top_models.is_empty() {
        lines.push(heading("Top models", colors));
        for (i, model) in summary.top_models.iter().enumerate() {
            lines.push(ranked_line(
                i,
                &model.name,
                Some(&model.provider_id),
                model.count,
                model.percentage,
                colors,
            ));
        }
        lines.push(Vec::new());
    }

    if !summary.top_providers.is_empty() {
        lines.push(heading("Top providers", colors));
        for (i, provider) in summary.top_providers.iter().enumerate() {
            lines.push(ranked_line(
                i,
                &provider.name,
                None,
                provider.count,
                provider.percentage,
                colors,
            ));
        }
        lines.push(Vec::new());
    }

    if !summary.top_tools.is_empty() {
        lines.push(heading("Top tools", colors));
        for (i, tool) in summary.top_tools.iter().enumerate() {
            lines.push(ranked_line(i, &tool.name, None, tool.count, tool.percentage, colors));
        }
        lines.push(Vec::new());
    }

    let weekdays = &summary.weekday_activity;
    lines.push(heading("Messages by weekday", colors));
    for (day, &count) in weekdays.counts.iter().enumerate() {
        let color = if count > 0 && day == weekdays.most_active_day {
            colors.accent_green
        } else {
            colors.accent_blue
        };
        lines.push(vec![
            Segment::colored(format!("  {} ", &WEEKDAY_NAMES[day][..3]), colors.text_muted),
            Segment::colored(
                pad_to_width(&bar(count, weekdays.max_count, BAR_WIDTH), BAR_WIDTH),
                color,
            ),
            Segment::colored(format!(" {}", format_number_full(count)), colors.text_primary),
        ]);
    }
    if weekdays.max_count > 0 {
        lines.push(vec![
            Segment::colored("  Favorite day: ", colors.text_muted),
            Segment::colored(weekdays.most_active_day_name, colors.accent_green).bold(),
        ]);
    }

    lines
}

/// Write the report. With `styled` off, no escape sequences are emitted.
pub fn render<W: Write>(
    out: &mut W,
    summary: &AnnualSummary,
    colors: &ThemeColors,
    styled: bool,
) -> io::Result<()> {
    for line in build_report(summary, colors) {
        for segment in &line {
            if !styled {
                queue!(out, Print(&segment.text))?;
                continue;
            }
            if let Some(color) = segment.color {
                queue!(out, SetForegroundColor(color))?;
            }
            if segment.bold {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            queue!(out, Print(&segment.text), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        queue!(out, Print("\n"))?;
    }
    out.flush()
}
