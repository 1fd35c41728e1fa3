//! TableWriter 布局性质验证
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：以随机字段组合驱动构建器，验证产出的字节总能通过 `check_root`，
//!   并且每个登记的字段都能经由 `Table` 原样读回；
//! - **设计手法 (How)**：字段值与是否出现均由 Proptest 生成，缺省值取固定常量，从而同时覆盖“被省略”与“被写入”两条路径；
//! - **合同 (What)**：任意合法输入下 `finish` 不返回错误，读取结果与输入一致，消息长度为 4 的倍数。

use proptest::prelude::*;
use spark_flatbuffers_wire::{Table, TableMut, TableWriter, check_root, field_voffset};

const HP_DEFAULT: i16 = 100;

fn arb_name() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-zA-Z0-9 ]{0,24}")
}

proptest! {
    #[test]
    fn prop_registered_fields_read_back(
        hp in any::<i16>(),
        flag in any::<bool>(),
        ratio in any::<f32>().prop_filter("NaN 不满足相等比较", |v| !v.is_nan()),
        name in arb_name(),
        inventory in proptest::collection::vec(any::<u8>(), 0..32),
        wide in proptest::collection::vec(any::<u64>(), 0..8),
    ) {
        let mut writer = TableWriter::new();
        writer.add_scalar(field_voffset(0), hp, HP_DEFAULT);
        writer.add_scalar(field_voffset(1), flag, false);
        writer.add_scalar(field_voffset(2), ratio, 0.0f32);
        if let Some(name) = name.as_deref() {
            writer.add_str(field_voffset(3), name).expect("str");
        }
        writer.add_vector(field_voffset(4), &inventory).expect("inventory");
        writer.add_vector(field_voffset(5), &wide).expect("wide");

        let bytes = writer.finish().expect("finish");
        prop_assert_eq!(bytes.len() % 4, 0);
        prop_assert_eq!(check_root(&bytes), Ok(()));

        let table = Table::follow_root(&bytes);
        prop_assert_eq!(table.get(field_voffset(0), HP_DEFAULT), hp);
        prop_assert_eq!(table.get(field_voffset(1), false), flag);
        prop_assert_eq!(table.get(field_voffset(2), 0.0f32), ratio);
        prop_assert_eq!(table.get_str(field_voffset(3)), name.as_deref());
        let read_inventory = table.get_vector::<u8>(field_voffset(4)).expect("inventory");
        prop_assert_eq!(read_inventory.bytes(), inventory.as_slice());
        let read_wide = table.get_vector::<u64>(field_voffset(5)).expect("wide");
        prop_assert_eq!(read_wide.to_vec(), wide);
    }

    #[test]
    fn prop_in_place_mutation_touches_only_target(
        initial in any::<u32>().prop_filter("缺省值会被省略", |v| *v != 0),
        replacement in any::<u32>(),
        tag in "[a-z]{1,12}",
    ) {
        let mut writer = TableWriter::new();
        writer.add_scalar(field_voffset(0), initial, 0u32);
        writer.add_str(field_voffset(1), &tag).expect("tag");
        let mut bytes = writer.finish().expect("finish");
        let before = bytes.clone();

        let mut table = TableMut::follow_root(&mut bytes);
        prop_assert!(table.set(field_voffset(0), replacement));
        prop_assert_eq!(table.get(field_voffset(0), 0u32), replacement);

        let view = Table::follow_root(&bytes);
        prop_assert_eq!(view.get_str(field_voffset(1)), Some(tag.as_str()));
        let changed = before.iter().zip(&bytes).filter(|(a, b)| a != b).count();
        prop_assert!(changed <= 4);
    }
}
