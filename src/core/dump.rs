//! # Dump and Restore
//!
//! Raw snapshots of a buffer region for offline capture and replay.
//!
//! A dump file is the region's logical bytes and nothing else: no header, no
//! length, no metadata. Loading one replaces the inbound region and rewinds
//! the read cursor.
//!
//! Every helper reports I/O problems as `PacketError::Io` and leaves the buffer
//! exactly as it was when it fails. The `_async` variants go through
//! `tokio::fs` with the same semantics.

use std::path::Path;

use tracing::{debug, error, instrument};

use crate::core::packet::PacketBuffer;
use crate::error::Result;

impl PacketBuffer {
    /// Load a file into the inbound region, replacing its contents
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn read_dump<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let data = std::fs::read(path.as_ref()).map_err(|e| {
            error!(error = %e, "Failed to read dump");
            e
        })?;
        let len = data.len();
        self.replace_inbound(data)?;
        debug!(len, "Loaded dump into inbound region");
        Ok(())
    }

    /// Write the inbound region's logical bytes to a file
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn write_dump_in<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_region(path.as_ref(), self.inbound())
    }

    /// Write the outbound region's logical bytes to a file
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn write_dump_out<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_region(path.as_ref(), self.outbound())
    }

    /// Async variant of [`read_dump`](Self::read_dump)
    pub async fn read_dump_async<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let data = tokio::fs::read(path.as_ref()).await.map_err(|e| {
            error!(error = %e, path = %path.as_ref().display(), "Failed to read dump");
            e
        })?;
        let len = data.len();
        self.replace_inbound(data)?;
        debug!(len, "Loaded dump into inbound region");
        Ok(())
    }

    /// Async variant of [`write_dump_in`](Self::write_dump_in)
    pub async fn write_dump_in_async<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_region_async(path.as_ref(), self.inbound()).await
    }

    /// Async variant of [`write_dump_out`](Self::write_dump_out)
    pub async fn write_dump_out_async<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_region_async(path.as_ref(), self.outbound()).await
    }
}

fn write_region(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data).map_err(|e| {
        error!(error = %e, "Failed to write dump");
        e
    })?;
    debug!(len = data.len(), "Wrote dump");
    Ok(())
}

async fn write_region_async(path: &Path, data: &[u8]) -> Result<()> {
    tokio::fs::write(path, data).await.map_err(|e| {
        error!(error = %e, path = %path.display(), "Failed to write dump");
        e
    })?;
    debug!(len = data.len(), "Wrote dump");
    Ok(())
}
