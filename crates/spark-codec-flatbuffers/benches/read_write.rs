use std::hint::black_box;
use std::{env, time::Duration};

use criterion::{BatchSize, Criterion};
use spark_codec_flatbuffers::{
    ByteCursor, ErrorStack, FlatBuffersMapper, ObjectMapper, TypedView, Value,
};
use spark_flatbuffers_fixtures::{Monster, MonsterT};

/// 映射器读写路径基准。
///
/// # 设计背景（Why）
/// - 写入路径只是“取出视图字节并交给输出槽”，读取路径则包含一次拷贝、一次查表与一次工厂调用；
///   两者都处在每条消息的热路径上，需要量化注册表读锁与装箱视图的开销；
///
/// # 逻辑解析（How）
/// - `mapper_write`：将同一个 `Monster` 视图反复写入预分配的 `Vec`；
/// - `mapper_read`：从新游标按令牌读出视图并访问一个字段，游标构造不计入测量；
/// - `pack_monster`：对照组，衡量打包内存表示本身的成本。
fn bench_mapper(c: &mut Criterion) {
    let mapper = FlatBuffersMapper::new();
    let view = TypedView::<Monster>::from_native(&MonsterT::sample()).expect("pack monster");
    let bytes = view.buffer().clone().into_bytes();
    let value = Value::from(view);
    let token = TypedView::<Monster>::type_token();

    c.bench_function("mapper_write", |b| {
        let mut sink: Vec<u8> = Vec::with_capacity(bytes.len());
        let mut errors = ErrorStack::new();
        b.iter(|| {
            sink.clear();
            mapper.write(&mut sink, black_box(&value), &mut errors);
            black_box(sink.len())
        });
    });

    c.bench_function("mapper_read", |b| {
        let mut errors = ErrorStack::new();
        b.iter_batched(
            || ByteCursor::new(bytes.clone()),
            |mut cursor| {
                let value = mapper.read(&mut cursor, Some(&token), &mut errors);
                let hp = value
                    .downcast::<Monster>()
                    .map(|view| view.table().hp())
                    .unwrap_or_default();
                black_box(hp)
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("pack_monster", |b| {
        let native = MonsterT::sample();
        b.iter(|| black_box(TypedView::<Monster>::from_native(black_box(&native))))
    });
}

fn main() {
    let quick_mode = env::args().skip(1).any(|arg| arg == "--quick");

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_mapper(&mut criterion);
    criterion.final_summary();
}
