//! Collapsible help-menu panel for the interactive prompt.
//!
//! A toggle opens and closes the panel; following an entry jumps to its
//! section and closes the panel if it was open.

/// One help section reachable from the menu.
#[derive(Debug)]
pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

const SECTIONS: [Section; 3] = [
    Section {
        id: "about",
        title: "About",
        body: "Paste a video URL and press Enter; the service converts it to \
               audio and the file lands in your download directory.",
    },
    Section {
        id: "quality",
        title: "Quality",
        body: "Set default_quality in config.toml (kbit/s) to request a \
               specific bitrate; unset leaves the choice to the service.",
    },
    Section {
        id: "privacy",
        title: "Privacy",
        body: "Each request carries a browser-style header fingerprint (user \
               agent, language, screen, timezone). No cookies are read or \
               sent. Run `mcc fingerprint` to see the exact headers.",
    },
];

#[derive(Debug, Default)]
pub struct MenuPanel {
    open: bool,
}

impl MenuPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the panel; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Looks up a section by id or 1-based index. A hit closes the panel.
    pub fn follow(&mut self, entry: &str) -> Option<&'static Section> {
        let entry = entry.trim();
        let section = SECTIONS
            .iter()
            .find(|s| s.id.eq_ignore_ascii_case(entry))
            .or_else(|| {
                entry
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| SECTIONS.get(i))
            });
        if section.is_some() {
            self.open = false;
        }
        section
    }

    pub fn sections() -> &'static [Section] {
        &SECTIONS
    }
}
