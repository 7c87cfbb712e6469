use anyhow::{Result, anyhow};

use disball::config::FeedConfig;
use disball::export::export_match;
use disball::feed::{load_match, source_for};
use disball::ratings::PlayerRating;
use disball::state::MatchLoad;

fn main() -> Result<()> {
    let config = FeedConfig::from_env();
    let match_id = parse_match_arg()
        .or_else(|| std::env::var("MATCH_ID").ok())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| anyhow!("no match id: pass --match=<id> or set MATCH_ID"))?;

    let source = source_for(&config);
    let view = match load_match(source.as_ref(), &match_id) {
        MatchLoad::Ready(view) => view,
        MatchLoad::NoData => {
            println!("Match {match_id}: nothing to display");
            return Ok(());
        }
        MatchLoad::Failed(reason) => return Err(anyhow!(reason)),
        MatchLoad::Loading => return Err(anyhow!("match {match_id} did not finish loading")),
    };

    println!("{}", view.shot_map.figure.title);
    println!("Shots: {}", view.shot_map.figure.markers().count());
    print_side(&view.shot_map.home_name, &view.ratings.home);
    print_side(&view.shot_map.away_name, &view.ratings.away);

    let report = export_match(&config.export_dir, &match_id, &view)?;
    println!("SVG: {}", report.svg_path.display());
    println!("XLSX: {} ({} players)", report.xlsx_path.display(), report.players);
    Ok(())
}

fn print_side(team: &str, players: &[PlayerRating]) {
    println!("{team}");
    for player in players {
        println!(
            "  {:<28} {:>9}  {}",
            player.name,
            player.rating.to_string(),
            player.rating.tier().label()
        );
    }
}

fn parse_match_arg() -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(id) = arg.strip_prefix("--match=") {
            let trimmed = id.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--match" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.clone());
            }
        }
    }
    None
}
