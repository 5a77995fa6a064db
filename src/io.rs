//! Offline curve dumps.
//!
//! Writes the (time, value) pairs of a curve to a flat text file, one
//! coefficient per line: the time first, then the value fields separated by
//! single spaces. SE3 values follow the `x y z qx qy qz qw` field order.
//! This is an inspection aid only; nothing on the evaluation or
//! optimization hot path goes through here.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::core::Time;
use crate::error::CurveResult;
use crate::interp::SE3;

/// Write rows of (time, fields) to a flat text file.
pub fn save_times_and_values<P, I>(path: P, rows: I) -> CurveResult<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (Time, Vec<f64>)>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let mut count = 0usize;
    for (time, fields) in rows {
        write!(writer, "{time}")?;
        for field in fields {
            write!(writer, " {field}")?;
        }
        writeln!(writer)?;
        count += 1;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), rows = count, "saved curve times and values");
    Ok(())
}

/// Field layout for one SE3 value: `x y z qx qy qz qw`.
pub fn se3_fields(pose: &SE3) -> Vec<f64> {
    let t = pose.translation.vector;
    let q = pose.rotation.quaternion();
    vec![t.x, t.y, t.z, q.i, q.j, q.k, q.w]
}
