// Copyright © 2025 Soft Sprint Studios
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! The developer console: an input line editor, scrollback history, and a
//! timestamped output buffer, wired to the [`crate::command::CommandTable`]
//! and [`crate::cvar::CvarStore`].

use std::collections::VecDeque;
use std::fmt::Display;

use chrono::{Duration, Utc};

use crate::command::{tokenize, CommandTable};
use crate::cvar::CvarStore;

/// The line of text currently being edited in the console.
pub struct ConsoleInput {
    text: Vec<char>,
    curs: usize,
}

impl ConsoleInput {
    pub fn new() -> ConsoleInput {
        ConsoleInput {
            text: Vec::new(),
            curs: 0,
        }
    }

    pub fn get_text(&self) -> Vec<char> {
        self.text.clone()
    }

    pub fn set_text(&mut self, text: &[char]) {
        self.text = text.to_vec();
        self.curs = self.text.len();
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.curs, c);
        self.cursor_right();
    }

    pub fn cursor_right(&mut self) {
        if self.curs < self.text.len() {
            self.curs += 1;
        }
    }

    pub fn cursor_left(&mut self) {
        if self.curs > 0 {
            self.curs -= 1;
        }
    }

    pub fn delete(&mut self) {
        if self.curs < self.text.len() {
            self.text.remove(self.curs);
        }
    }

    pub fn backspace(&mut self) {
        if self.curs > 0 {
            self.text.remove(self.curs - 1);
            self.curs -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.curs = 0;
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

pub struct History {
    lines: VecDeque<Vec<char>>,
    curs: usize,
}

impl History {
    pub fn new() -> History {
        History {
            lines: VecDeque::new(),
            curs: 0,
        }
    }

    pub fn add_line(&mut self, line: Vec<char>) {
        self.lines.push_front(line);
        self.curs = 0;
    }

    pub fn line_up(&mut self) -> Option<Vec<char>> {
        if self.lines.is_empty() || self.curs >= self.lines.len() {
            None
        } else {
            self.curs += 1;
            Some(self.lines[self.curs - 1].clone())
        }
    }

    pub fn line_down(&mut self) -> Option<Vec<char>> {
        if self.curs > 0 {
            self.curs -= 1;
        }

        if self.curs > 0 {
            Some(self.lines[self.curs - 1].clone())
        } else {
            Some(Vec::new())
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// A ring buffer of output lines, each with an optional timestamp used to
/// decide whether it should still be shown on an onscreen HUD overlay.
pub struct ConsoleOutput {
    lines: VecDeque<(String, Option<i64>)>,
}

impl ConsoleOutput {
    pub fn new() -> ConsoleOutput {
        ConsoleOutput {
            lines: VecDeque::new(),
        }
    }

    fn push(&mut self, line: String, timestamp: Option<i64>) {
        self.lines.push_front((line, timestamp));
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|(s, _)| s.as_str())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn recent_lines(&self, interval: Duration, max_candidates: usize, max_results: usize) -> Vec<&str> {
        let cutoff = (Utc::now() - interval).timestamp();
        self.lines
            .iter()
            .take(max_candidates)
            .rev()
            .filter_map(move |(l, t)| if (*t)? > cutoff { Some(l.as_str()) } else { None })
            .take(max_results)
            .collect()
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// The developer console. Owns the input editor, the scrollback history and
/// the output buffer, and serves as the execution front-end over the
/// command table and cvar store.
pub struct Console {
    input: ConsoleInput,
    hist: History,
    buffer: String,
    output: ConsoleOutput,
}

impl Console {
    pub fn new() -> Console {
        Console {
            input: ConsoleInput::new(),
            hist: History::new(),
            buffer: String::new(),
            output: ConsoleOutput::new(),
        }
    }

    pub fn print(&mut self, s: impl AsRef<str>) {
        for line in s.as_ref().split('\n') {
            self.output.push(line.to_owned(), None);
        }
    }

    pub fn println(&mut self, s: impl AsRef<str>) {
        self.print(s);
    }

    pub fn println_alert(&mut self, s: impl AsRef<str>) {
        let ts = Some(Utc::now().timestamp());
        self.output.push(s.as_ref().to_owned(), ts);
    }

    /// Logs an error the way §7 requires: printed to the console in the
    /// error color (approximated here by an `[error]` prefix) and mirrored
    /// to `log::error!` so headless runs still surface it.
    pub fn report(&mut self, err: impl Display) {
        let line = format!("[error] {}", err);
        error!("{}", line);
        self.println_alert(line);
    }

    pub fn send_char(&mut self, c: char) {
        match c {
            '`' | '\x1b' => (),
            '\r' => {
                let mut entered: String = self.input.get_text().into_iter().collect();
                entered.push('\n');
                self.buffer.push_str(&entered);
                self.hist.add_line(self.input.get_text());

                let mut echoed = String::from("]");
                echoed.extend(self.input.get_text());
                self.output.push(echoed, None);

                self.input.clear();
            }
            '\x08' => self.input.backspace(),
            '\x7f' => self.input.delete(),
            '\t' => warn!("tab completion not implemented"),
            c => self.input.insert(c),
        }
    }

    pub fn cursor(&self) -> usize {
        self.input.curs
    }

    pub fn cursor_right(&mut self) {
        self.input.cursor_right();
    }

    pub fn cursor_left(&mut self) {
        self.input.cursor_left();
    }

    pub fn history_up(&mut self) {
        if let Some(line) = self.hist.line_up() {
            self.input.set_text(&line);
        }
    }

    pub fn history_down(&mut self) {
        if let Some(line) = self.hist.line_down() {
            self.input.set_text(&line);
        }
    }

    pub fn get_string(&self) -> String {
        self.input.get_text().into_iter().collect()
    }

    pub fn stuff_text(&mut self, text: impl AsRef<str>) {
        self.buffer.push_str(text.as_ref());
        self.buffer.push('\n');
    }

    pub fn output(&self) -> &ConsoleOutput {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Takes ownership of the pending execution buffer, leaving it empty.
    /// Used by [`crate::engine::Engine`] when a command needs broader
    /// engine state than [`CommandTable::execute`] sees.
    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Interprets the contents of the execution buffer: one line of text per
    /// command invocation, dispatched through `cmds`/`cvars` with cheat
    /// gating read from the `g_cheats` cvar.
    pub fn execute(&mut self, cmds: &CommandTable, cvars: &mut CvarStore) {
        let text = std::mem::take(&mut self.buffer);
        let cheats_enabled = cvars.get_bool("g_cheats");

        for line in text.lines() {
            let argv = tokenize(line);
            if argv.is_empty() {
                continue;
            }

            let out = cmds.execute(&argv, cvars, cheats_enabled);
            if !out.is_empty() {
                self.println(out);
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandFlags;
    use crate::cvar::CvarFlags;

    #[test]
    fn execute_runs_stuffed_text_through_command_table() {
        let mut cmds = CommandTable::new();
        cmds.register(
            "echo",
            Box::new(|args| args.join(" ")),
            "prints a message",
            CommandFlags::NONE,
        )
        .unwrap();
        let mut cvars = CvarStore::new();

        let mut console = Console::new();
        console.stuff_text("echo hello");
        console.execute(&cmds, &mut cvars);

        assert_eq!(console.output().lines().next(), Some("hello"));
    }

    #[test]
    fn cheat_gate_follows_g_cheats_cvar() {
        let mut cmds = CommandTable::new();
        cmds.register(
            "noclip",
            Box::new(|_| "toggled".to_owned()),
            "",
            CommandFlags::CHEAT,
        )
        .unwrap();
        let mut cvars = CvarStore::new();
        cvars.register("g_cheats", "0", "", CvarFlags::NONE).unwrap();

        let mut console = Console::new();
        console.stuff_text("noclip");
        console.execute(&cmds, &mut cvars);
        assert!(console.output().lines().next().unwrap().starts_with("[error]"));

        cvars.engine_set("g_cheats", "1");
        console.stuff_text("noclip");
        console.execute(&cmds, &mut cvars);
        assert_eq!(console.output().lines().next(), Some("toggled"));
    }

    #[test]
    fn history_navigation() {
        let mut console = Console::new();
        console.stuff_text("ignored");
        console.input.set_text(&['m', 'a', 'p']);
        for c in "map start\r".chars() {
            console.send_char(c);
        }
        console.history_up();
        assert_eq!(console.get_string(), "map start");
    }
}
