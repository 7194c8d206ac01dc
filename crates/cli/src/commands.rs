use colored::Colorize;

use phraser_core::domain::types::{Tone, UnknownTone};
use phraser_core::infra::output::ClipboardOutput;
use phraser_core::usecase::PhraserService;

/// REPL コマンド名（補完用）
pub const COMMAND_NAMES: &[&str] = &[
    "/paste", "/tone", "/tones", "/go", "/clear", "/copy", "/show", "/stats", "/help",
];

/// コマンド解析エラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try /help)")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Tone(#[from] UnknownTone),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 入力欄の置き換え（キー入力相当）
    Edit(String),
    /// 貼り付け。引数なしならクリップボードから読む
    Paste(Option<String>),
    Tone(Tone),
    Tones,
    Submit,
    Clear,
    Copy,
    Show,
    Stats,
    Help,
    Quit,
}

pub enum Flow {
    Continue,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed == "quit" || trimmed == "exit" {
        return Ok(Command::Quit);
    }
    if !trimmed.starts_with('/') {
        return Ok(Command::Edit(line.to_string()));
    }

    // 区切りの空白 1 文字だけを落とす（/paste の引数は前後の空白も含めて渡す）
    let (name, raw) = line
        .trim_start()
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let rest = raw.trim();

    match name {
        "/paste" => Ok(Command::Paste((!rest.is_empty()).then(|| raw.to_string()))),
        "/tone" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("/tone"));
            }
            Ok(Command::Tone(rest.parse()?))
        }
        "/tones" => Ok(Command::Tones),
        "/go" | "/paraphrase" => Ok(Command::Submit),
        "/clear" => Ok(Command::Clear),
        "/copy" => Ok(Command::Copy),
        "/show" => Ok(Command::Show),
        "/stats" => Ok(Command::Stats),
        "/help" => Ok(Command::Help),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// コマンドをサービスのトリガーに振り分ける
pub fn dispatch(service: &PhraserService, command: Command) -> Flow {
    match command {
        Command::Edit(text) => {
            service.on_text_edit(&text);
        }
        Command::Paste(Some(text)) => {
            service.on_paste(&text);
        }
        Command::Paste(None) => match ClipboardOutput::read_text() {
            Ok(text) => {
                println!("{}", format!("pasted {} chars", text.chars().count()).bright_black());
                service.on_paste(&text);
            }
            Err(e) => {
                log::warn!("貼り付け失敗: {e}");
                println!("{}", "Clipboard is empty or unavailable".yellow());
            }
        },
        Command::Tone(tone) => {
            service.on_tone_selected(tone);
        }
        Command::Tones => print_tones(service.snapshot().tone),
        Command::Submit => {
            if service.on_submit().is_none() {
                println!("{}", "Nothing to paraphrase".bright_black());
            }
        }
        Command::Clear => service.on_clear(),
        Command::Copy => {
            if service.copy_result() {
                println!("{}", "Copied".green());
            }
        }
        Command::Show => {
            let snap = service.snapshot();
            println!(
                "{} {} {} {}",
                "session:".bright_black(),
                snap.session_id,
                "since".bright_black(),
                service.started_at()
            );
            println!(
                "{} {} {} {}",
                "state:".bright_black(),
                service.state().as_str(),
                "ordering:".bright_black(),
                service.ordering().as_str()
            );
            println!("{} {}", "tone:".bright_black(), snap.tone.to_string().cyan());
            println!("{} {}", "text:".bright_black(), snap.text);
            println!("{} {}", "result:".bright_black(), snap.result.bright_blue());
            if snap.busy {
                println!("{}", "(paraphrasing...)".yellow());
            }
        }
        Command::Stats => match serde_json::to_string_pretty(&service.get_metrics()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("メトリクス出力失敗: {e}"),
        },
        Command::Help => print_help(),
        Command::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn print_tones(current: Tone) {
    for tone in Tone::ALL {
        let line = format!("  {} {}", tone.index(), tone);
        if tone == current {
            println!("{}", line.cyan().bold());
        } else {
            println!("{line}");
        }
    }
}

fn print_help() {
    let rows = [
        ("<text>", "replace the input text (no request)"),
        ("/paste [text]", "paste text, or the clipboard, and paraphrase"),
        ("/tone <name|index>", "switch tone and paraphrase the input"),
        ("/tones", "list tones"),
        ("/go", "paraphrase the input with the current tone"),
        ("/clear", "clear input and result"),
        ("/copy", "copy the result to the clipboard"),
        ("/show", "show the session"),
        ("/stats", "show request metrics"),
        ("quit", "exit"),
    ];
    for (cmd, desc) in rows {
        println!("  {:<20} {}", cmd.bright_cyan(), desc.bright_black());
    }
}
