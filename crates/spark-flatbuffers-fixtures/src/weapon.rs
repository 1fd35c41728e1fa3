use core::fmt;

use spark_flatbuffers_wire::{
    NativeTable, RootTable, Table, TableMut, TableWriter, VOffset, WireError, field_voffset,
};

const VT_NAME: VOffset = field_voffset(0);
const VT_DAMAGE: VOffset = field_voffset(1);

/// `Weapon` 表的类型级标记。
///
/// 与 [`crate::Monster`] 并列存在，用于验证注册表不会混淆不同 schema 类型。
#[derive(Clone, Copy, Debug, Default)]
pub struct Weapon;

impl RootTable for Weapon {
    const FULLY_QUALIFIED_NAME: &'static str = "MyGame.Sample.Weapon";

    type Ref<'a> = WeaponRef<'a>;
    type Mut<'a> = TableMut<'a>;

    fn follow_root(buf: &[u8]) -> WeaponRef<'_> {
        WeaponRef {
            table: Table::follow_root(buf),
        }
    }

    fn follow_root_mut(buf: &mut [u8]) -> TableMut<'_> {
        TableMut::follow_root(buf)
    }
}

/// `Weapon` 只读访问器。
#[derive(Clone, Copy)]
pub struct WeaponRef<'a> {
    table: Table<'a>,
}

impl<'a> WeaponRef<'a> {
    /// 名称。
    pub fn name(&self) -> Option<&'a str> {
        self.table.get_str(VT_NAME)
    }

    /// 伤害值。
    pub fn damage(&self) -> i16 {
        self.table.get(VT_DAMAGE, 0)
    }
}

impl fmt::Debug for WeaponRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Weapon")
            .field("name", &self.name())
            .field("damage", &self.damage())
            .finish()
    }
}

/// `Weapon` 的内存表示。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeaponT {
    /// 名称。
    pub name: Option<String>,
    /// 伤害值。
    pub damage: i16,
}

impl NativeTable for WeaponT {
    type Root = Weapon;

    fn pack(&self, writer: &mut TableWriter) -> Result<(), WireError> {
        if let Some(name) = self.name.as_deref() {
            writer.add_str(VT_NAME, name)?;
        }
        writer.add_scalar(VT_DAMAGE, self.damage, 0);
        Ok(())
    }
}
