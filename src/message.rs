use crate::error::Loc;
use color_print::cprintln;

/// A diagnostic destined for the terminal. Messages are collected while the
/// pipeline runs and rendered in one batch so their order is reproducible.
#[derive(Debug, Clone)]
pub struct Msg {
    kind: MsgKind,
    text: String,
    loc: Option<Loc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgKind {
    Info,
    Warn,
    Error,
}

impl Msg {
    pub fn info(text: impl Into<String>, loc: Option<Loc>) -> Self {
        Msg {
            kind: MsgKind::Info,
            text: text.into(),
            loc,
        }
    }

    pub fn warn(text: impl Into<String>, loc: Option<Loc>) -> Self {
        Msg {
            kind: MsgKind::Warn,
            text: text.into(),
            loc,
        }
    }

    pub fn error(text: impl Into<String>, loc: Option<Loc>) -> Self {
        Msg {
            kind: MsgKind::Error,
            text: text.into(),
            loc,
        }
    }

    pub fn kind(&self) -> MsgKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn loc(&self) -> Option<&Loc> {
        self.loc.as_ref()
    }

    fn print(&self, source: &str) {
        match self.kind {
            MsgKind::Error => cprintln!("<red,bold>error</>: {}", self.text),
            MsgKind::Warn => cprintln!("<yellow,bold>warn</>: {}", self.text),
            MsgKind::Info => cprintln!("<green,bold>info</>: {}", self.text),
        }
        if let Some(loc) = &self.loc {
            let quoted = source.lines().nth(loc.line - 1).unwrap_or("");
            cprintln!("     <blue>--></> <underline>{}</>", loc);
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", loc.line, quoted);
            cprintln!("      <blue>|</> {}<red,bold>^</>", " ".repeat(loc.col - 1));
        }
    }
}

pub fn dump(msgs: &[Msg], source: &str) {
    for msg in msgs {
        msg.print(source);
    }
}

pub fn has_error(msgs: &[Msg]) -> bool {
    msgs.iter().any(|msg| msg.kind == MsgKind::Error)
}
