use colored::Colorize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use phraser_core::domain::session::SessionSnapshot;

/// 描画すべき変化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    BusyStarted,
    BusyFinished,
    ResultChanged(String),
    ToneChanged(String),
}

/// 前後のスナップショットから描画イベントを求める
pub fn diff(prev: &SessionSnapshot, next: &SessionSnapshot) -> Vec<RenderEvent> {
    let mut events = Vec::new();
    if prev.tone != next.tone {
        events.push(RenderEvent::ToneChanged(next.tone.to_string()));
    }
    if !prev.busy && next.busy {
        events.push(RenderEvent::BusyStarted);
    }
    if prev.result != next.result {
        events.push(RenderEvent::ResultChanged(next.result.clone()));
    }
    if prev.busy && !next.busy {
        events.push(RenderEvent::BusyFinished);
    }
    events
}

fn render(event: &RenderEvent) {
    match event {
        RenderEvent::BusyStarted => println!("{}", "paraphrasing...".yellow()),
        RenderEvent::BusyFinished => println!("{}", "done".bright_black()),
        RenderEvent::ToneChanged(tone) => println!("{} {}", "tone:".bright_black(), tone.cyan()),
        RenderEvent::ResultChanged(result) if result.is_empty() => {
            println!("{}", "(result cleared)".bright_black())
        }
        RenderEvent::ResultChanged(result) => {
            for line in result.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
}

/// セッションの変化を端末に描画するタスク
pub fn spawn_renderer(mut rx: watch::Receiver<SessionSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut prev = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            for event in diff(&prev, &next) {
                render(&event);
            }
            prev = next;
        }
    })
}
