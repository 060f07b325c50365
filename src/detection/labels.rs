//! Pascal VOC 类别名称 (20类)

use phf::phf_map;

/// 类别数量
pub const NUM_CLASSES: usize = 20;

/// 按网络输出顺序排列的类别名称
pub static LABELS: [&str; NUM_CLASSES] = [
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "pottedplant",
    "sheep",
    "sofa",
    "train",
    "tvmonitor",
];

static LABEL_INDICES: phf::Map<&'static str, usize> = phf_map! {
    "aeroplane" => 0,
    "bicycle" => 1,
    "bird" => 2,
    "boat" => 3,
    "bottle" => 4,
    "bus" => 5,
    "car" => 6,
    "cat" => 7,
    "chair" => 8,
    "cow" => 9,
    "diningtable" => 10,
    "dog" => 11,
    "horse" => 12,
    "motorbike" => 13,
    "person" => 14,
    "pottedplant" => 15,
    "sheep" => 16,
    "sofa" => 17,
    "train" => 18,
    "tvmonitor" => 19,
};

/// 类别索引 → 名称
pub fn label(class_index: usize) -> Option<&'static str> {
    LABELS.get(class_index).copied()
}

/// 名称 → 类别索引 (大小写不敏感)
pub fn class_index(name: &str) -> Option<usize> {
    LABEL_INDICES.get(name.to_lowercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_table_matches_labels() {
        for (i, name) in LABELS.iter().enumerate() {
            assert_eq!(class_index(name), Some(i));
        }
        assert_eq!(LABEL_INDICES.len(), NUM_CLASSES);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(label(0), Some("aeroplane"));
        assert_eq!(label(19), Some("tvmonitor"));
        assert_eq!(label(20), None);
        assert_eq!(class_index("Person"), Some(14));
        assert_eq!(class_index("giraffe"), None);
    }
}
