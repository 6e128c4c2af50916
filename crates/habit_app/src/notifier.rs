use habit_domain::notifications::{Notice, NoticeLevel, Notifier};

/// Prints notices to stderr, one line each.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::debug!(message = %notice.message, "error notice"),
            NoticeLevel::Warning => tracing::debug!(message = %notice.message, "warning notice"),
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::trace!(message = %notice.message, "notice")
            }
        }
        eprintln!("{} {}", marker(notice.level), notice.message);
    }
}

fn marker(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "[ok]",
        NoticeLevel::Error => "[error]",
        NoticeLevel::Warning => "[warn]",
        NoticeLevel::Info => "[info]",
    }
}
