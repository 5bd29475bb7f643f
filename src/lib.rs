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

//! Core runtime of the Tectonic engine: the console/cvar substrate, the
//! entity/scene data model, the I/O event graph and logic entity runtime,
//! and the editor undo engine. Rendering, physics, sound, video decoding,
//! model loading and networking are external collaborators, represented
//! here only by the narrow trait seams in [`backends`].

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod backends;
pub mod command;
pub mod console;
pub mod cvar;
pub mod engine;
pub mod error;
pub mod io_graph;
pub mod logic;
pub mod math;
pub mod scene;
pub mod serialize;
pub mod trigger;
pub mod undo;
