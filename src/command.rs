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

//! Name→handler mapping; dispatches argv-style invocations and integrates
//! with the cvar store on miss (§4.2), plus the text script executor.

use std::collections::HashMap;
use std::fs;

use crate::cvar::CvarStore;
use crate::error::CommandError;

/// Fixed capacity of the command table (§4.2).
pub const MAX_COMMANDS: usize = 256;

/// Upper bound on tokens per script line (§4.2).
pub const MAX_ARGV: usize = 32;

bitflags! {
    pub struct CommandFlags: u8 {
        const NONE  = 0b0;
        const CHEAT = 0b1;
    }
}

pub type CommandHandler = Box<dyn Fn(&[&str]) -> String>;

struct CommandEntry {
    handler: CommandHandler,
    description: String,
    flags: CommandFlags,
}

/// Case-insensitive name→handler lookup.
pub struct CommandTable {
    cmds: HashMap<String, CommandEntry>,
    order: Vec<String>,
}

impl CommandTable {
    pub fn new() -> CommandTable {
        CommandTable {
            cmds: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    pub fn register(
        &mut self,
        name: &str,
        handler: CommandHandler,
        description: &str,
        flags: CommandFlags,
    ) -> Result<(), CommandError> {
        let key = Self::key(name);
        if self.cmds.contains_key(&key) {
            return Err(CommandError::DuplicateCommand(name.to_owned()));
        }
        if self.cmds.len() >= MAX_COMMANDS {
            return Err(CommandError::RegistryFull(MAX_COMMANDS));
        }
        self.order.push(key.clone());
        self.cmds.insert(
            key,
            CommandEntry {
                handler,
                description: description.to_owned(),
                flags,
            },
        );
        Ok(())
    }

    /// Registers a new command, replacing any existing one of the same name.
    pub fn insert_or_replace(
        &mut self,
        name: &str,
        handler: CommandHandler,
        description: &str,
        flags: CommandFlags,
    ) {
        let key = Self::key(name);
        if !self.cmds.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.cmds.insert(
            key,
            CommandEntry {
                handler,
                description: description.to_owned(),
                flags,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cmds.contains_key(&Self::key(name))
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.cmds.get(&Self::key(name)).map(|e| e.description.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().filter_map(move |key| {
            self.cmds
                .get(key)
                .map(|e| (key.as_str(), e.description.as_str()))
        })
    }

    /// Invokes the named command directly, honoring its cheat gate.
    pub fn exec(&self, name: &str, argv: &[&str], cheats_enabled: bool) -> Result<String, CommandError> {
        let entry = self
            .cmds
            .get(&Self::key(name))
            .ok_or_else(|| CommandError::NoSuchCommand(name.to_owned()))?;

        if entry.flags.contains(CommandFlags::CHEAT) && !cheats_enabled {
            return Err(CommandError::CheatProtected(name.to_owned()));
        }

        Ok((entry.handler)(argv))
    }

    /// Top-level dispatch (§4.2): commands take priority, then the cvar
    /// fallback (print or set), then "Unknown command or cvar".
    pub fn execute(&self, argv: &[&str], cvars: &mut CvarStore, cheats_enabled: bool) -> String {
        let Some(&name) = argv.first() else {
            return String::new();
        };

        if self.contains(name) {
            return match self.exec(name, &argv[1..], cheats_enabled) {
                Ok(out) => out,
                Err(e) => format!("[error] {}", e),
            };
        }

        if cvars.contains(name) {
            return match argv.get(1) {
                Some(value) => match cvars.set(name, value, cheats_enabled) {
                    Ok(()) => String::new(),
                    Err(e) => format!("[error] {}", e),
                },
                None => format!(
                    "{} = {} // {}",
                    name,
                    cvars.get_string(name),
                    cvars.help_text(name).unwrap_or_default()
                ),
            };
        }

        "Unknown command or cvar".to_owned()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a line on ASCII whitespace into at most [`MAX_ARGV`] tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_ARGV)
        .collect()
}

/// Reads `path` line by line, strips whitespace, skips blank lines and
/// lines beginning with `/` or `#`, tokenizes the rest and feeds each to
/// [`CommandTable::execute`]. A single failing command does not abort the
/// script; a missing file is reported and the call returns with no output.
pub fn exec_script(
    path: &str,
    cmds: &CommandTable,
    cvars: &mut CvarStore,
    cheats_enabled: bool,
) -> Result<Vec<String>, CommandError> {
    let text = fs::read_to_string(path).map_err(|_| CommandError::ScriptNotFound(path.to_owned()))?;

    let mut output = Vec::new();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('/') || line.starts_with('#') {
            continue;
        }

        let argv = tokenize(line);
        if argv.is_empty() {
            continue;
        }

        let out = cmds.execute(&argv, cvars, cheats_enabled);
        if !out.is_empty() {
            output.push(out);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cvar::CvarFlags;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    #[test]
    fn dispatches_registered_command() {
        let mut cmds = CommandTable::new();
        cmds.register(
            "echo",
            Box::new(|args| args.first().copied().unwrap_or("").to_owned()),
            "prints a message",
            CommandFlags::NONE,
        )
        .unwrap();

        let mut cvars = CvarStore::new();
        let out = cmds.execute(&["echo", "hello"], &mut cvars, false);
        assert_eq!(out, "hello");
    }

    #[test]
    fn falls_back_to_cvar_get_and_set() {
        let mut cmds = CommandTable::new();
        let mut cvars = CvarStore::new();
        cvars
            .register("sensitivity", "1.0", "mouse sensitivity", CvarFlags::NONE)
            .unwrap();

        cmds.execute(&["sensitivity", "3.0"], &mut cvars, false);
        assert_eq!(cvars.get_string("sensitivity"), "3.0");

        let out = cmds.execute(&["sensitivity"], &mut cvars, false);
        assert_eq!(out, "sensitivity = 3.0 // mouse sensitivity");
    }

    #[test]
    fn unknown_name_reports_error() {
        let cmds = CommandTable::new();
        let mut cvars = CvarStore::new();
        let out = cmds.execute(&["frobnicate"], &mut cvars, false);
        assert_eq!(out, "Unknown command or cvar");
    }

    #[test]
    fn cheat_command_blocked_without_cheats() {
        let mut cmds = CommandTable::new();
        cmds.register(
            "noclip",
            Box::new(|_| String::new()),
            "toggles noclip",
            CommandFlags::CHEAT,
        )
        .unwrap();
        let mut cvars = CvarStore::new();
        let out = cmds.execute(&["noclip"], &mut cvars, false);
        assert!(out.starts_with("[error]"));
    }

    #[test]
    fn script_executor_skips_comments_and_blank_lines() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = calls.clone();

        let mut cmds = CommandTable::new();
        cmds.register(
            "echo",
            Box::new(move |args| {
                calls_clone.borrow_mut().push(args.join(" "));
                String::new()
            }),
            "",
            CommandFlags::NONE,
        )
        .unwrap();

        let mut cvars = CvarStore::new();
        let dir = std::env::temp_dir();
        let path = dir.join("tectonic_test_script.cfg");
        {
            let mut f = fs::File::create(&path).unwrap();
            writeln!(f, "// a comment").unwrap();
            writeln!(f).unwrap();
            writeln!(f, "# another comment").unwrap();
            writeln!(f, "echo hello world").unwrap();
        }

        exec_script(path.to_str().unwrap(), &cmds, &mut cvars, false).unwrap();
        assert_eq!(calls.borrow().as_slice(), &["hello world".to_owned()]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_script_reports_error_without_panicking() {
        let cmds = CommandTable::new();
        let mut cvars = CvarStore::new();
        let result = exec_script("/nonexistent/path/to/script.cfg", &cmds, &mut cvars, false);
        assert!(result.is_err());
    }
}
