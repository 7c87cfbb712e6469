use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::ratings::{PlayerRating, Rating, RatingTier};
use crate::state::MatchView;

pub struct ExportReport {
    pub svg_path: PathBuf,
    pub xlsx_path: PathBuf,
    pub players: usize,
}

pub fn export_match(dir: &Path, match_id: &str, view: &MatchView) -> Result<ExportReport> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed creating export dir {}", dir.display()))?;
    let stem = sanitize_id(match_id);

    let svg_path = dir.join(format!("shotmap_{stem}.svg"));
    fs::write(&svg_path, view.shot_map.figure.to_svg())
        .with_context(|| format!("failed writing {}", svg_path.display()))?;

    let xlsx_path = dir.join(format!("ratings_{stem}.xlsx"));
    let players = write_ratings_workbook(&xlsx_path, view)?;

    Ok(ExportReport {
        svg_path,
        xlsx_path,
        players,
    })
}

fn write_ratings_workbook(path: &Path, view: &MatchView) -> Result<usize> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let mut players = 0usize;
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Ratings")?;
        for (col, title) in ["Side", "Team", "Player", "Rating", "Tier"].iter().enumerate() {
            sheet
                .write_string_with_format(0, col as u16, *title, &header)
                .context("write header")?;
        }
        sheet.set_column_width(2, 28)?;

        let sides = [
            ("Home", view.shot_map.home_name.as_str(), &view.ratings.home),
            ("Away", view.shot_map.away_name.as_str(), &view.ratings.away),
        ];
        let mut row = 1u32;
        for (side, team, list) in sides {
            for player in list.iter() {
                write_player_row(sheet, row, side, team, player)?;
                row += 1;
                players += 1;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(players)
}

fn write_player_row(
    sheet: &mut Worksheet,
    row: u32,
    side: &str,
    team: &str,
    player: &PlayerRating,
) -> Result<()> {
    let tier = player.rating.tier();
    let cell = Format::new()
        .set_background_color(Color::RGB(tier.color().as_u32()))
        .set_font_color(tier_font_color(tier));

    sheet
        .write_string(row, 0, side)
        .with_context(|| format!("write cell ({row},0)"))?;
    sheet
        .write_string(row, 1, team)
        .with_context(|| format!("write cell ({row},1)"))?;
    sheet
        .write_string(row, 2, &player.name)
        .with_context(|| format!("write cell ({row},2)"))?;
    match player.rating {
        Rating::Value(value) => sheet.write_number_with_format(row, 3, value, &cell),
        Rating::NoRating => sheet.write_string_with_format(row, 3, "No Rating", &cell),
    }
    .with_context(|| format!("write cell ({row},3)"))?;
    sheet
        .write_string(row, 4, tier.label())
        .with_context(|| format!("write cell ({row},4)"))?;
    Ok(())
}

fn tier_font_color(tier: RatingTier) -> Color {
    match tier {
        RatingTier::Good | RatingTier::Average => Color::Black,
        _ => Color::White,
    }
}

fn sanitize_id(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "match".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_id;

    #[test]
    fn ids_are_safe_file_stems() {
        assert_eq!(sanitize_id("4506263"), "4506263");
        assert_eq!(sanitize_id("../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_id("  "), "match");
    }
}
