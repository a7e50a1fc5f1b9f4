use std::io::Write;
use std::path::Path;

use crate::data::parameter::Parameter;

/// Write a parameter's history as CSV.
///
/// Columns: absolute timestamp (epoch seconds), time relative to `start`, value.
/// The value column is headed by the parameter's PV name.
pub fn write_history_csv<W: Write>(
    mut w: W,
    param: &Parameter,
    start: f64,
) -> std::io::Result<()> {
    writeln!(w, "timestamp_seconds,relative_seconds,{}", param.pv_name)?;
    for &[t, y] in param.history.iter() {
        writeln!(w, "{:.6},{:.6},{}", start + t, t, y)?;
    }
    Ok(())
}

pub fn save_history_csv<P: AsRef<Path>>(
    path: P,
    param: &Parameter,
    start: f64,
) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(f);
    write_history_csv(&mut w, param, start)?;
    w.flush()
}
