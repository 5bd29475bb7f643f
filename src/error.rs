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

//! Error kinds for the four core subsystems.
//!
//! Per the error-handling design, none of these are meant to propagate out
//! of a frame tick. Callers log them to the console (error color) and treat
//! the triggering write as a no-op; see [`crate::console::Console::report`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvarError {
    #[error("cvar registry is full ({0} cvars)")]
    RegistryFull(usize),
    #[error("no such cvar: {0}")]
    NoSuchCvar(String),
    #[error("cvar '{0}' is hidden and cannot be set from user input")]
    Hidden(String),
    #[error("cvar '{0}' is cheat protected")]
    CheatProtected(String),
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("command table is full ({0} commands)")]
    RegistryFull(usize),
    #[error("command already registered: {0}")]
    DuplicateCommand(String),
    #[error("no such command: {0}")]
    NoSuchCommand(String),
    #[error("could not open script file: {0}")]
    ScriptNotFound(String),
    #[error("command '{0}' is cheat protected")]
    CheatProtected(String),
}

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("{kind} container is full ({capacity} entities)")]
    ContainerFull { kind: &'static str, capacity: usize },
    #[error("no entity at index {index} of kind {kind}")]
    NoSuchEntity { kind: &'static str, index: usize },
    #[error("too many properties on entity (max {0})")]
    TooManyProperties(usize),
}

#[derive(Error, Debug)]
pub enum IoGraphError {
    #[error("max IO connections exceeded ({0})")]
    TooManyConnections(usize),
    #[error("max pending events exceeded ({0})")]
    TooManyPendingEvents(usize),
    #[error("division by zero in math_counter arithmetic")]
    DivideByZero,
}

#[derive(Error, Debug)]
pub enum UndoError {
    #[error("snapshot allocation failed: {0}")]
    SnapshotFailed(String),
    #[error("undo stack is empty")]
    NothingToUndo,
    #[error("redo stack is empty")]
    NothingToRedo,
}

/// Startup-gate failures (§5 single-instance lock). Unlike the four errors
/// above, these DO propagate — they can only occur before the tick loop
/// starts, matching §7's "no aborts outside the startup gate" carve-out.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("another instance is already running (lock held at {0})")]
    LockHeld(String),
    #[error("io error acquiring instance lock: {0}")]
    LockIo(#[from] std::io::Error),
}
