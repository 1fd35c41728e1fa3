use core::fmt;

use spark_flatbuffers_wire::{
    NativeTable, RootTable, Table, TableMut, TableWriter, Vector, VOffset, WireError,
    field_voffset,
};

const VT_POS: VOffset = field_voffset(0);
const VT_MANA: VOffset = field_voffset(1);
const VT_HP: VOffset = field_voffset(2);
const VT_NAME: VOffset = field_voffset(3);
// field_voffset(4) 为已废弃的 `friendly`，保留槽位以兼容旧消息。
const VT_INVENTORY: VOffset = field_voffset(5);
const VT_COLOR: VOffset = field_voffset(6);

/// 怪物颜色，线格式为单字节。
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Color {
    /// 红。
    Red = 1,
    /// 绿。
    Green = 2,
    /// 蓝，schema 缺省值。
    #[default]
    Blue = 8,
}

impl Color {
    /// 从线格式字节还原；未知取值返回 `None`。
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            8 => Some(Color::Blue),
            _ => None,
        }
    }

    /// 线格式字节。
    pub fn to_raw(self) -> u8 {
        self as u8
    }
}

/// 三维坐标，内联 struct，宽 12 字节、按 4 字节对齐。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// x 分量。
    pub x: f32,
    /// y 分量。
    pub y: f32,
    /// z 分量。
    pub z: f32,
}

impl Vec3 {
    /// 线格式宽度。
    pub const SIZE: usize = 12;
    /// 线格式对齐。
    pub const ALIGN: usize = 4;

    /// 构造坐标。
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 编码为小端字节。
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.y.to_le_bytes());
        out[8..12].copy_from_slice(&self.z.to_le_bytes());
        out
    }

    /// 从小端字节还原，长度不足时返回 `None`。
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let lane = |index: usize| -> Option<f32> {
            let raw: [u8; 4] = bytes.get(index * 4..index * 4 + 4)?.try_into().ok()?;
            Some(f32::from_le_bytes(raw))
        };
        Some(Self {
            x: lane(0)?,
            y: lane(1)?,
            z: lane(2)?,
        })
    }
}

/// `Monster` 表的类型级标记。
#[derive(Clone, Copy, Debug, Default)]
pub struct Monster;

impl Monster {
    /// `mana` 缺省值。
    pub const DEFAULT_MANA: i16 = 150;
    /// `hp` 缺省值。
    pub const DEFAULT_HP: i16 = 100;
}

impl RootTable for Monster {
    const FULLY_QUALIFIED_NAME: &'static str = "MyGame.Sample.Monster";

    type Ref<'a> = MonsterRef<'a>;
    type Mut<'a> = MonsterMut<'a>;

    fn follow_root(buf: &[u8]) -> MonsterRef<'_> {
        MonsterRef {
            table: Table::follow_root(buf),
        }
    }

    fn follow_root_mut(buf: &mut [u8]) -> MonsterMut<'_> {
        MonsterMut {
            table: TableMut::follow_root(buf),
        }
    }
}

/// `Monster` 只读访问器。
#[derive(Clone, Copy)]
pub struct MonsterRef<'a> {
    table: Table<'a>,
}

impl<'a> MonsterRef<'a> {
    /// 坐标；未写入时返回 `None`。
    pub fn pos(&self) -> Option<Vec3> {
        self.table
            .get_struct_bytes(VT_POS, Vec3::SIZE)
            .and_then(Vec3::from_bytes)
    }

    /// 法力值。
    pub fn mana(&self) -> i16 {
        self.table.get(VT_MANA, Monster::DEFAULT_MANA)
    }

    /// 生命值。
    pub fn hp(&self) -> i16 {
        self.table.get(VT_HP, Monster::DEFAULT_HP)
    }

    /// 名称。
    pub fn name(&self) -> Option<&'a str> {
        self.table.get_str(VT_NAME)
    }

    /// 背包物品编号。
    pub fn inventory(&self) -> Option<Vector<'a, u8>> {
        self.table.get_vector(VT_INVENTORY)
    }

    /// 颜色；未知取值回退为缺省值。
    pub fn color(&self) -> Color {
        Color::from_raw(self.table.get(VT_COLOR, Color::Blue.to_raw())).unwrap_or_default()
    }

    /// 解包为内存表示。
    pub fn unpack(&self) -> MonsterT {
        MonsterT {
            pos: self.pos(),
            mana: self.mana(),
            hp: self.hp(),
            name: self.name().map(str::to_owned),
            inventory: self
                .inventory()
                .map(|v| v.bytes().to_vec())
                .unwrap_or_default(),
            color: self.color(),
        }
    }
}

impl fmt::Debug for MonsterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monster")
            .field("pos", &self.pos())
            .field("mana", &self.mana())
            .field("hp", &self.hp())
            .field("name", &self.name())
            .field("inventory", &self.inventory())
            .field("color", &self.color())
            .finish()
    }
}

/// `Monster` 可写访问器，只能覆盖已写入缓冲的定长字段。
pub struct MonsterMut<'a> {
    table: TableMut<'a>,
}

impl MonsterMut<'_> {
    /// 以只读视角访问。
    pub fn view(&self) -> MonsterRef<'_> {
        MonsterRef {
            table: self.table.as_table(),
        }
    }

    /// 生命值。
    pub fn hp(&self) -> i16 {
        self.view().hp()
    }

    /// 法力值。
    pub fn mana(&self) -> i16 {
        self.view().mana()
    }

    /// 原地改写生命值；字段因等于缺省值被省略时返回 `false`。
    pub fn mutate_hp(&mut self, hp: i16) -> bool {
        self.table.set(VT_HP, hp)
    }

    /// 原地改写法力值。
    pub fn mutate_mana(&mut self, mana: i16) -> bool {
        self.table.set(VT_MANA, mana)
    }

    /// 原地改写颜色。
    pub fn mutate_color(&mut self, color: Color) -> bool {
        self.table.set(VT_COLOR, color.to_raw())
    }

    /// 原地改写坐标。
    pub fn mutate_pos(&mut self, pos: Vec3) -> bool {
        self.table.set_struct_bytes(VT_POS, &pos.to_bytes())
    }
}

impl fmt::Debug for MonsterMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.view(), f)
    }
}

/// `Monster` 的内存表示。
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterT {
    /// 坐标。
    pub pos: Option<Vec3>,
    /// 法力值。
    pub mana: i16,
    /// 生命值。
    pub hp: i16,
    /// 名称。
    pub name: Option<String>,
    /// 背包物品编号。
    pub inventory: Vec<u8>,
    /// 颜色。
    pub color: Color,
}

impl Default for MonsterT {
    fn default() -> Self {
        Self {
            pos: None,
            mana: Monster::DEFAULT_MANA,
            hp: Monster::DEFAULT_HP,
            name: None,
            inventory: Vec::new(),
            color: Color::Blue,
        }
    }
}

impl MonsterT {
    /// 示例程序中使用的 “MyMonster”。
    pub fn sample() -> Self {
        Self {
            pos: Some(Vec3::new(1.0, 2.0, 3.0)),
            mana: 150,
            hp: 80,
            name: Some("MyMonster".to_owned()),
            inventory: vec![0, 1, 2, 3, 4],
            color: Color::Green,
        }
    }
}

impl NativeTable for MonsterT {
    type Root = Monster;

    fn pack(&self, writer: &mut TableWriter) -> Result<(), WireError> {
        if let Some(pos) = self.pos {
            writer.add_struct(VT_POS, &pos.to_bytes(), Vec3::ALIGN);
        }
        writer.add_scalar(VT_MANA, self.mana, Monster::DEFAULT_MANA);
        writer.add_scalar(VT_HP, self.hp, Monster::DEFAULT_HP);
        if let Some(name) = self.name.as_deref() {
            writer.add_str(VT_NAME, name)?;
        }
        if !self.inventory.is_empty() {
            writer.add_vector(VT_INVENTORY, &self.inventory)?;
        }
        writer.add_scalar(VT_COLOR, self.color.to_raw(), Color::Blue.to_raw());
        Ok(())
    }
}
