use bag_api::{MessageWriter, PluginError};

use super::reader::Ros1Reader;
use super::std_msgs::header;

type Result = std::result::Result<(), PluginError>;

fn xyz_f64(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("x", r.f64()?);
    w.write("y", r.f64()?);
    w.write("z", r.f64()?);
    Ok(())
}

pub(crate) fn point(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    xyz_f64(r, w)
}

pub(crate) fn vector3(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    xyz_f64(r, w)
}

pub(crate) fn point32(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("x", r.f32()?);
    w.write("y", r.f32()?);
    w.write("z", r.f32()?);
    Ok(())
}

pub(crate) fn quaternion(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    xyz_f64(r, w)?;
    w.write("w", r.f64()?);
    Ok(())
}

pub(crate) fn pose2d(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write("x", r.f64()?);
    w.write("y", r.f64()?);
    w.write("theta", r.f64()?);
    Ok(())
}

pub(crate) fn pose(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write_message("position", |w| point(r, w))?;
    w.write_message("orientation", |w| quaternion(r, w))
}

pub(crate) fn transform(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write_message("translation", |w| vector3(r, w))?;
    w.write_message("rotation", |w| quaternion(r, w))
}

/// Two `Vector3` fields, e.g. `linear`/`angular` or `force`/`torque`.
fn vector_pair(r: &mut Ros1Reader<'_>, w: &mut MessageWriter, first: &str, second: &str) -> Result {
    w.write_message(first, |w| vector3(r, w))?;
    w.write_message(second, |w| vector3(r, w))
}

pub(crate) fn twist(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    vector_pair(r, w, "linear", "angular")
}

pub(crate) fn accel(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    vector_pair(r, w, "linear", "angular")
}

pub(crate) fn wrench(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    vector_pair(r, w, "force", "torque")
}

// ── Stamped ──

macro_rules! stamped {
    ($($name:ident => $field:literal, $inner:ident;)*) => {
        $(
            pub(crate) fn $name(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
                w.write_message("header", |w| header(r, w))?;
                w.write_message($field, |w| $inner(r, w))
            }
        )*
    };
}

stamped! {
    point_stamped => "point", point;
    vector3_stamped => "vector", vector3;
    pose_stamped => "pose", pose;
    twist_stamped => "twist", twist;
}

pub(crate) fn transform_stamped(r: &mut Ros1Reader<'_>, w: &mut MessageWriter) -> Result {
    w.write_message("header", |w| header(r, w))?;
    w.write("child_frame_id", r.string()?);
    w.write_message("transform", |w| transform(r, w))
}
