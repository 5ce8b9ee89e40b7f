//! Fixed table from legacy type names to host type names and
//! transcoding functions. At most one entry per legacy type.

use std::collections::HashMap;
use std::sync::OnceLock;

use bag_api::{MessageWriter, PluginError};

use crate::convert::{geometry_msgs, std_msgs, Ros1Reader};

/// Reads one legacy payload and writes the host fields in declaration order.
pub type TranscodeFn = fn(&mut Ros1Reader<'_>, &mut MessageWriter) -> Result<(), PluginError>;

#[derive(Debug, Clone, Copy)]
pub struct TypeMapping {
    /// e.g. `std_msgs/String`
    pub legacy_type: &'static str,
    /// e.g. `std_msgs/msg/String`
    pub host_type: &'static str,
    pub transcode: TranscodeFn,
}

macro_rules! table {
    ($($pkg:literal / $name:literal => $f:path,)*) => {
        &[
            $(
                TypeMapping {
                    legacy_type: concat!($pkg, "/", $name),
                    host_type: concat!($pkg, "/msg/", $name),
                    transcode: $f,
                },
            )*
        ]
    };
}

static TABLE: &[TypeMapping] = table! {
    "std_msgs" / "Bool" => std_msgs::bool,
    "std_msgs" / "Byte" => std_msgs::byte,
    "std_msgs" / "Char" => std_msgs::char,
    "std_msgs" / "ColorRGBA" => std_msgs::color_rgba,
    "std_msgs" / "Empty" => std_msgs::empty,
    "std_msgs" / "Float32" => std_msgs::float32,
    "std_msgs" / "Float64" => std_msgs::float64,
    "std_msgs" / "Header" => std_msgs::header,
    "std_msgs" / "Int8" => std_msgs::int8,
    "std_msgs" / "Int16" => std_msgs::int16,
    "std_msgs" / "Int32" => std_msgs::int32,
    "std_msgs" / "Int64" => std_msgs::int64,
    "std_msgs" / "UInt8" => std_msgs::uint8,
    "std_msgs" / "UInt16" => std_msgs::uint16,
    "std_msgs" / "UInt32" => std_msgs::uint32,
    "std_msgs" / "UInt64" => std_msgs::uint64,
    "std_msgs" / "String" => std_msgs::string,
    "std_msgs" / "MultiArrayDimension" => std_msgs::multi_array_dimension,
    "std_msgs" / "MultiArrayLayout" => std_msgs::multi_array_layout,
    "std_msgs" / "ByteMultiArray" => std_msgs::byte_multi_array,
    "std_msgs" / "Float32MultiArray" => std_msgs::float32_multi_array,
    "std_msgs" / "Float64MultiArray" => std_msgs::float64_multi_array,
    "std_msgs" / "Int8MultiArray" => std_msgs::int8_multi_array,
    "std_msgs" / "Int16MultiArray" => std_msgs::int16_multi_array,
    "std_msgs" / "Int32MultiArray" => std_msgs::int32_multi_array,
    "std_msgs" / "Int64MultiArray" => std_msgs::int64_multi_array,
    "std_msgs" / "UInt8MultiArray" => std_msgs::uint8_multi_array,
    "std_msgs" / "UInt16MultiArray" => std_msgs::uint16_multi_array,
    "std_msgs" / "UInt32MultiArray" => std_msgs::uint32_multi_array,
    "std_msgs" / "UInt64MultiArray" => std_msgs::uint64_multi_array,
    "geometry_msgs" / "Point" => geometry_msgs::point,
    "geometry_msgs" / "Point32" => geometry_msgs::point32,
    "geometry_msgs" / "Vector3" => geometry_msgs::vector3,
    "geometry_msgs" / "Quaternion" => geometry_msgs::quaternion,
    "geometry_msgs" / "Pose" => geometry_msgs::pose,
    "geometry_msgs" / "Pose2D" => geometry_msgs::pose2d,
    "geometry_msgs" / "Transform" => geometry_msgs::transform,
    "geometry_msgs" / "Twist" => geometry_msgs::twist,
    "geometry_msgs" / "Accel" => geometry_msgs::accel,
    "geometry_msgs" / "Wrench" => geometry_msgs::wrench,
    "geometry_msgs" / "PointStamped" => geometry_msgs::point_stamped,
    "geometry_msgs" / "Vector3Stamped" => geometry_msgs::vector3_stamped,
    "geometry_msgs" / "PoseStamped" => geometry_msgs::pose_stamped,
    "geometry_msgs" / "TwistStamped" => geometry_msgs::twist_stamped,
    "geometry_msgs" / "TransformStamped" => geometry_msgs::transform_stamped,
};

/// All mappings, in table order.
pub fn entries() -> &'static [TypeMapping] {
    TABLE
}

pub fn lookup(legacy_type: &str) -> Option<&'static TypeMapping> {
    static INDEX: OnceLock<HashMap<&'static str, &'static TypeMapping>> = OnceLock::new();
    INDEX
        .get_or_init(|| TABLE.iter().map(|m| (m.legacy_type, m)).collect())
        .get(legacy_type)
        .copied()
}
