use crate::error::Result;
use serde::Serialize;
use std::io::Write;

pub struct Emitter;

impl Emitter {
    /// Write `record` as one compact JSON line and flush.
    pub fn emit<W, T>(mut writer: W, record: &T) -> Result<()>
    where
        W: Write,
        T: Serialize + ?Sized,
    {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
