//! 演示：两端通过 `FlatBuffersMapper` 交换 `Monster` 消息。
//!
//! - “服务端”打包样例怪物并以长度前缀分帧写出；
//! - “客户端”按类型令牌读回视图，原地改写生命值后写回；
//! - 服务端再次读取并打印结果。
//!
//! 运行：`RUST_LOG=spark_codec_flatbuffers=trace cargo run --example monster_exchange`

use anyhow::{Context, Result, bail};
use spark_codec_flatbuffers::{
    BufferHandle, ByteCursor, ErrorStack, FlatBuffersMapper, MapperConfig, ObjectMapper,
    TypedView, Value,
};
use spark_flatbuffers_fixtures::{Monster, MonsterT};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
content_type = "application/x-flatbuffers"
framing = "size_prefixed"
max_message_size = 4096
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = MapperConfig::from_toml_str(CONFIG).context("parse mapper config")?;
    let mapper = FlatBuffersMapper::with_config(config);
    let token = TypedView::<Monster>::type_token();
    let descriptor = mapper.descriptor_for(&token);
    info!(
        content_type = descriptor.content_type().as_str(),
        schema = ?descriptor.schema().map(|schema| schema.name()),
        "mapper ready"
    );

    // 服务端 -> 客户端
    let outgoing =
        TypedView::<Monster>::from_native(&MonsterT::sample()).context("pack monster")?;
    let mut wire: Vec<u8> = Vec::new();
    let mut errors = ErrorStack::new();
    mapper.write(&mut wire, &Value::from(outgoing), &mut errors);
    info!(bytes = wire.len(), "server sent monster");

    let mut cursor = ByteCursor::new(wire);
    let received = mapper.read(&mut cursor, Some(&token), &mut errors);
    let received = errors.into_result(received)?;
    let Ok(view) = received.downcast::<Monster>() else {
        bail!("client expected a monster view");
    };
    info!(monster = ?view.table(), "client received");

    // 客户端在独占副本上改写后回传
    let handle = BufferHandle::exclusive_from_vec(view.bytes().to_vec());
    let mut editable =
        TypedView::<Monster>::from_mutable_buffer(handle).context("exclusive buffer")?;
    let mut monster = editable.mutable_table().context("mutable view")?;
    if !monster.mutate_hp(monster.hp() - 30) {
        bail!("hp field is absent from the buffer");
    }

    let mut errors = ErrorStack::new();
    let mut reply: Vec<u8> = Vec::new();
    mapper.write(&mut reply, &Value::from(editable.freeze()), &mut errors);
    let mut cursor = ByteCursor::new(reply);
    let answer = mapper.read(&mut cursor, Some(&token), &mut errors);
    let answer = errors.into_result(answer)?;
    let Ok(view) = answer.downcast::<Monster>() else {
        bail!("server expected a monster view");
    };
    let monster = view.table();
    info!(hp = monster.hp(), name = ?monster.name(), "server received reply");
    Ok(())
}
