use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use elsa::FrozenVec;

/// Identifies a loaded source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u32);

/// Backing storage for file contents.
///
/// `FrozenVec` hands out slices that survive later pushes, which is what
/// lets tokens and AST names borrow their bytes for the whole compilation.
#[derive(Default)]
pub struct SourceBuffer {
    bufs: FrozenVec<Vec<u8>>,
}

impl SourceBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The registry of loaded files, borrowing their contents from a
/// [`SourceBuffer`].
pub struct Source<'buf> {
    storage: &'buf SourceBuffer,
    files: Vec<SourceFile<'buf>>,
}

impl<'buf> Source<'buf> {
    /// The mutable borrow guarantees nothing else appends to `storage`
    /// behind this registry's back.
    pub fn new(storage: &'buf mut SourceBuffer) -> Self {
        Self {
            storage: &*storage,
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, path: PathBuf, contents: Vec<u8>) -> SourceId {
        debug_assert_eq!(self.storage.bufs.len(), self.files.len());

        let id = SourceId(self.files.len() as u32);
        let buf = self.storage.bufs.push_get(contents);

        self.files.push(SourceFile { id, path, buf });

        id
    }

    pub fn load(&mut self, path: PathBuf) -> io::Result<SourceId> {
        let contents = fs::read(&path)?;

        Ok(self.add_file(path, contents))
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile<'buf>> {
        self.files.get(id.0 as usize)
    }
}

#[derive(Debug)]
pub struct SourceFile<'buf> {
    id: SourceId,
    path: PathBuf,
    buf: &'buf [u8],
}

impl<'buf> SourceFile<'buf> {
    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buf(&self) -> &'buf [u8] {
        self.buf
    }

    /// The text of a 1-based line, without its terminator. Diagnostics
    /// use this to quote the offending line.
    pub fn line(&self, line: usize) -> Option<&'buf [u8]> {
        self.buf
            .split(|&c| c == b'\n')
            .nth(line.checked_sub(1)?)
            .map(|text| text.strip_suffix(b"\r").unwrap_or(text))
    }
}
