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

//! The configuration and scripting substrate every other subsystem reads
//! from: a case-insensitive name→value registry with type-widened
//! accessors and flag-gated write policy.

use std::collections::HashMap;
use std::fs;
use std::io::Write;

use crate::error::CvarError;

/// Fixed capacity of the registry (§4.1).
pub const MAX_CVARS: usize = 1024;

bitflags! {
    pub struct CvarFlags: u8 {
        const NONE   = 0b000;
        /// Hidden from `help`/`cmdlist` output and from `save`.
        const HIDDEN = 0b001;
        /// Writes from the user input path are blocked unless cheats are enabled.
        const CHEAT  = 0b010;
    }
}

#[derive(Debug, Clone)]
struct Cvar {
    name: String,
    string_value: String,
    float_value: f32,
    int_value: i32,
    help_text: String,
    flags: CvarFlags,
}

impl Cvar {
    fn set_string_value(&mut self, value: &str) {
        self.string_value = value.to_owned();
        self.float_value = value.parse::<f32>().unwrap_or(0.0);
        self.int_value = value.parse::<i32>().unwrap_or(0);
    }
}

/// Name→value mapping for tunable settings.
///
/// Single-writer: reads never block writes and each accessor reads only its
/// own field, so callers never observe a torn multi-field update (§4.1
/// ordering/consistency).
pub struct CvarStore {
    cvars: HashMap<String, Cvar>,
    order: Vec<String>,
}

impl CvarStore {
    pub fn new() -> CvarStore {
        CvarStore {
            cvars: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    /// Registers a cvar, or, if already present, reconciles its help text
    /// and flags while preserving the current value (§4.1, §6).
    pub fn register(
        &mut self,
        name: &str,
        default: &str,
        help: &str,
        flags: CvarFlags,
    ) -> Result<(), CvarError> {
        let key = Self::key(name);

        if let Some(existing) = self.cvars.get_mut(&key) {
            existing.help_text = help.to_owned();
            existing.flags = flags;
            return Ok(());
        }

        if self.cvars.len() >= MAX_CVARS {
            return Err(CvarError::RegistryFull(MAX_CVARS));
        }

        let mut cvar = Cvar {
            name: name.to_owned(),
            string_value: String::new(),
            float_value: 0.0,
            int_value: 0,
            help_text: help.to_owned(),
            flags,
        };
        cvar.set_string_value(default);
        self.order.push(key.clone());
        self.cvars.insert(key, cvar);
        Ok(())
    }

    /// Writes a value through the user input path: blocked by `HIDDEN`
    /// unconditionally and by `CHEAT` unless `cheats_enabled` is true.
    pub fn set(&mut self, name: &str, value: &str, cheats_enabled: bool) -> Result<(), CvarError> {
        let key = Self::key(name);
        let cvar = self
            .cvars
            .get_mut(&key)
            .ok_or_else(|| CvarError::NoSuchCvar(name.to_owned()))?;

        if cvar.flags.contains(CvarFlags::HIDDEN) {
            return Err(CvarError::Hidden(cvar.name.clone()));
        }
        if cvar.flags.contains(CvarFlags::CHEAT) && !cheats_enabled {
            return Err(CvarError::CheatProtected(cvar.name.clone()));
        }

        cvar.set_string_value(value);
        Ok(())
    }

    /// Writes a value bypassing the flag check entirely. Used by save/restore
    /// and boot scripts (§4.1). Creates the cvar if it does not yet exist, so
    /// that a later [`CvarStore::register`] call can reconcile its help/flags
    /// while preserving the value loaded here (§6).
    pub fn engine_set(&mut self, name: &str, value: &str) {
        let key = Self::key(name);
        if let Some(cvar) = self.cvars.get_mut(&key) {
            cvar.set_string_value(value);
            return;
        }

        let mut cvar = Cvar {
            name: name.to_owned(),
            string_value: String::new(),
            float_value: 0.0,
            int_value: 0,
            help_text: String::new(),
            flags: CvarFlags::NONE,
        };
        cvar.set_string_value(value);
        self.order.push(key.clone());
        self.cvars.insert(key, cvar);
    }

    pub fn get_string(&self, name: &str) -> String {
        self.cvars
            .get(&Self::key(name))
            .map(|c| c.string_value.clone())
            .unwrap_or_default()
    }

    pub fn get_float(&self, name: &str) -> f32 {
        self.cvars
            .get(&Self::key(name))
            .map(|c| c.float_value)
            .unwrap_or(0.0)
    }

    pub fn get_int(&self, name: &str) -> i32 {
        self.cvars
            .get(&Self::key(name))
            .map(|c| c.int_value)
            .unwrap_or(0)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get_int(name) != 0
    }

    pub fn help_text(&self, name: &str) -> Option<String> {
        self.cvars.get(&Self::key(name)).map(|c| c.help_text.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cvars.contains_key(&Self::key(name))
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.cvars
            .get(&Self::key(name))
            .map(|c| c.flags.contains(CvarFlags::HIDDEN))
            .unwrap_or(false)
    }

    /// Iterates registered cvars in registration order, yielding
    /// `(name, string_value, help_text, hidden)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str, bool)> {
        self.order.iter().filter_map(move |key| {
            self.cvars.get(key).map(|c| {
                (
                    c.name.as_str(),
                    c.string_value.as_str(),
                    c.help_text.as_str(),
                    c.flags.contains(CvarFlags::HIDDEN),
                )
            })
        })
    }

    /// Reads lines of the form `set "NAME" "VALUE"` and applies
    /// [`CvarStore::engine_set`] for each.
    pub fn load(&mut self, path: &str) -> std::io::Result<usize> {
        let text = fs::read_to_string(path)?;
        let mut count = 0;
        for line in text.lines() {
            if let Some((name, value)) = parse_set_line(line) {
                self.engine_set(&name, &value);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Writes every non-`HIDDEN` cvar in `set "NAME" "VALUE"` form.
    pub fn save(&self, path: &str) -> std::io::Result<usize> {
        let mut file = fs::File::create(path)?;
        let mut count = 0;
        for (name, value, _help, hidden) in self.iter() {
            if hidden {
                continue;
            }
            writeln!(file, "set \"{}\" \"{}\"", name, value)?;
            count += 1;
        }
        Ok(count)
    }
}

impl Default for CvarStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_set_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let rest = line.strip_prefix("set")?.trim_start();
    let mut parts = rest.splitn(2, '"').skip(1);
    let name = parts.next()?;
    let name_end = name.find('"')?;
    let (name, after_name) = name.split_at(name_end);
    let remainder = &after_name[1..];
    let value_start = remainder.find('"')? + 1;
    let value_rest = &remainder[value_start..];
    let value_end = value_rest.find('"')?;
    Some((name.to_owned(), value_rest[..value_end].to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrip() {
        let mut cvars = CvarStore::new();
        cvars.register("sensitivity", "1.0", "mouse sensitivity", CvarFlags::NONE).unwrap();
        cvars.set("sensitivity", "2.5", false).unwrap();
        assert_eq!(cvars.get_string("sensitivity"), "2.5");
        assert_eq!(cvars.get_float("sensitivity"), 2.5);
    }

    #[test]
    fn invalid_numeric_parse_yields_zero() {
        let mut cvars = CvarStore::new();
        cvars.register("mapname", "start", "", CvarFlags::NONE).unwrap();
        cvars.set("mapname", "dm1", false).unwrap();
        assert_eq!(cvars.get_float("mapname"), 0.0);
        assert_eq!(cvars.get_int("mapname"), 0);
    }

    #[test]
    fn cheat_gating() {
        let mut cvars = CvarStore::new();
        cvars.register("noclip", "0", "", CvarFlags::CHEAT).unwrap();
        assert!(cvars.set("noclip", "1", false).is_err());
        assert_eq!(cvars.get_string("noclip"), "0");
        cvars.set("noclip", "1", true).unwrap();
        assert_eq!(cvars.get_string("noclip"), "1");
    }

    #[test]
    fn hidden_blocks_user_set_but_not_engine_set() {
        let mut cvars = CvarStore::new();
        cvars
            .register("engine_running", "1", "", CvarFlags::HIDDEN)
            .unwrap();
        assert!(cvars.set("engine_running", "0", true).is_err());
        cvars.engine_set("engine_running", "0");
        assert_eq!(cvars.get_string("engine_running"), "0");
    }

    #[test]
    fn register_is_idempotent_and_keeps_value() {
        let mut cvars = CvarStore::new();
        cvars.register("fov_vertical", "55", "old help", CvarFlags::NONE).unwrap();
        cvars.set("fov_vertical", "90", false).unwrap();
        cvars
            .register("fov_vertical", "55", "new help", CvarFlags::NONE)
            .unwrap();
        assert_eq!(cvars.get_string("fov_vertical"), "90");
        assert_eq!(cvars.help_text("fov_vertical").unwrap(), "new help");
    }

    #[test]
    fn load_creates_unregistered_cvar_and_register_preserves_value() {
        let mut cvars = CvarStore::new();
        cvars.engine_set("crosshair", "1");
        assert_eq!(cvars.get_string("crosshair"), "1");
        cvars
            .register("crosshair", "0", "toggle crosshair", CvarFlags::NONE)
            .unwrap();
        assert_eq!(cvars.get_string("crosshair"), "1");
    }

    #[test]
    fn case_insensitive_lookup() {
        let mut cvars = CvarStore::new();
        cvars.register("FOV_Vertical", "55", "", CvarFlags::NONE).unwrap();
        cvars.set("fov_vertical", "80", false).unwrap();
        assert_eq!(cvars.get_string("FOV_VERTICAL"), "80");
    }

    #[test]
    fn parse_set_line_extracts_name_and_value() {
        assert_eq!(
            parse_set_line("set \"volume\" \"2.5\""),
            Some(("volume".to_owned(), "2.5".to_owned()))
        );
        assert_eq!(parse_set_line("// a comment"), None);
    }
}
