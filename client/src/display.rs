use shared::shared_jumble_game::{
    countdown::format_time, economy::format_cooldown_time, Board, CooldownStatus, ResourceKind, RoundReport,
    Selection, WordVerdict,
};

use crate::jumble::{PurchasePrompt, SessionState};

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    SelectRack(usize),
    SelectGrid(usize),
    Place { rack: usize, grid: usize },
    Return(usize),
    Hint,
    Shuffle,
    Submit,
    Next,
    Restart,
    Buy(ResourceKind),
    WatchAd,
    Extend,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  start              spend a trial and start a game
  r <i>              select rack letter i
  g <i>              select grid cell i (place, pick up, move or swap)
  p <rack> <grid>    place a rack letter into a grid cell
  b <grid>           put a grid letter back on the rack
  h | s              hint | shuffle
  submit             check the grid
  next | restart     next level | new game
  buy hint|shuffle|trial
  ad                 watch an ad for gems
  extend             watch an ad for more time
  status | quit";

fn index(arg: Option<&str>) -> Result<usize, String> {
    let raw = arg.ok_or_else(|| "missing index".to_string())?;
    raw.parse::<usize>().map_err(|_| format!("not an index: {}", raw))
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err("empty command".to_string());
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "r" => Command::SelectRack(index(parts.next())?),
        "g" => Command::SelectGrid(index(parts.next())?),
        "p" => {
            let rack = index(parts.next())?;
            let grid = index(parts.next())?;
            Command::Place { rack, grid }
        }
        "b" => Command::Return(index(parts.next())?),
        "h" | "hint" => Command::Hint,
        "s" | "shuffle" => Command::Shuffle,
        "submit" => Command::Submit,
        "next" => Command::Next,
        "restart" => Command::Restart,
        "buy" => match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("hint") => Command::Buy(ResourceKind::Hint),
            Some("shuffle") => Command::Buy(ResourceKind::Shuffle),
            Some("trial") => Command::Buy(ResourceKind::Trial),
            _ => return Err("buy what? hint, shuffle or trial".to_string()),
        },
        "ad" => Command::WatchAd,
        "extend" => Command::Extend,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "q" | "quit" => Command::Quit,
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(command)
}

fn cell(letter: Option<char>, selected: bool) -> String {
    let shown = letter.unwrap_or('_');
    if selected {
        format!("<{}>", shown)
    } else {
        format!("[{}]", shown)
    }
}

pub fn render_board(board: &Board, grid_sizes: [usize; 3]) -> String {
    let mut out = String::new();
    let mut start = 0;
    for length in grid_sizes {
        let row: Vec<String> = (start..start + length)
            .map(|i| {
                let letter = board.grid.get(i).copied().flatten();
                format!("{:>2}{}", i, cell(letter, board.selection == Selection::Grid(i)))
            })
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
        start += length;
    }

    let rack: Vec<String> = board
        .rack
        .iter()
        .enumerate()
        .map(|(i, letter)| format!("{}{}", i, cell(*letter, board.selection == Selection::Rack(i))))
        .collect();
    out.push_str("rack: ");
    out.push_str(&rack.join(" "));
    out
}

pub fn render_state(state: &SessionState) -> String {
    let mut out = format!(
        "level {} | score {} | best {} | gems {}",
        state.level, state.session_score, state.wallet.highest_score, state.wallet.gems
    );
    if let Some(countdown) = state.countdown.filter(|c| c.is_active()) {
        out.push_str(&format!(" | {}", format_time(countdown.remaining)));
    }
    if let (Some(puzzle), Some(board)) = (&state.puzzle, &state.board) {
        out.push('\n');
        out.push_str(&render_board(board, puzzle.grid_sizes));
    }
    out
}

pub fn render_report(report: &RoundReport) -> String {
    let mut out = String::new();
    for word in &report.per_word {
        let mark = match word.verdict {
            WordVerdict::Correct => "✔",
            WordVerdict::Incorrect => "✘",
            WordVerdict::Incomplete => "…",
        };
        out.push_str(&format!(
            "{} {} ({}) +{}\n",
            mark,
            word.submitted.as_deref().unwrap_or("-"),
            word.target,
            word.points
        ));
    }
    out.push_str(&format!(
        "{}/{} correct, +{} points",
        report.correct_count, report.total_words, report.points_earned
    ));
    out
}

pub fn render_prompt(prompt: &PurchasePrompt) -> String {
    let mut out = format!("No {}s left.", prompt.kind);
    if prompt.cooldown.num_seconds() > 0 {
        out.push_str(&format!(" Free ones return in {}.", format_cooldown_time(prompt.cooldown.num_seconds())));
    }
    if prompt.can_afford {
        out.push_str(&format!(" Buy one for {} gems with `buy {}`.", prompt.cost_gems, prompt.kind));
    } else {
        out.push_str(&format!(
            " You need {} gems but have {}; `ad` grants {}.",
            prompt.cost_gems, prompt.gems, prompt.ad_bonus
        ));
    }
    out
}

pub fn render_status(statuses: &[CooldownStatus]) -> String {
    statuses
        .iter()
        .map(|status| {
            let mut line = format!(
                "{}: {} free, {} bought",
                status.kind, status.free_remaining, status.purchased
            );
            if let Some(seconds) = status.remaining_seconds.filter(|_| status.in_cooldown) {
                line.push_str(&format!(", resets in {}", format_cooldown_time(seconds)));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("p 2 5"), Ok(Command::Place { rack: 2, grid: 5 }));
        assert_eq!(parse_command("  G 3 "), Ok(Command::SelectGrid(3)));
        assert_eq!(parse_command("buy Trial"), Ok(Command::Buy(ResourceKind::Trial)));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert!(parse_command("p 2").is_err());
        assert!(parse_command("r x").is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn test_render_board_marks_selection() {
        let board = Board {
            grid: vec![Some('C'), None, Some('T'), None, None, None],
            rack: vec![Some('A'), None],
            selection: Selection::Rack(0),
        };
        let text = render_board(&board, [3, 0, 3]);
        assert!(text.starts_with(" 0[C]  1[_]  2[T]\n"));
        assert!(text.ends_with("rack: 0<A> 1[_]"));
    }
}
