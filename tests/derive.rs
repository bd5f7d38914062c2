#![allow(dead_code)]

use chainring::{
    avec::{self, writer::Writer},
    sans::{
        data::{Field, Message, StringMode, Value},
        definition::BaseType,
        header::HeaderLength,
    },
};

#[derive(Debug, Message)]
#[message(19)]
struct Lap {
    #[field(253)]
    timestamp: u32,
    #[field(7)]
    total_elapsed_time: Option<u32>,
    #[field(26)]
    name: Option<String>,
    scratch: Vec<u8>,
    #[field(13)]
    total_ascent: u16,
    #[field(31)]
    grade: Option<i16>,
    #[field(100)]
    ratio: f32,
}

fn lap() -> Lap {
    Lap {
        timestamp: 1_000_000,
        total_elapsed_time: None,
        name: Some("Climb".into()),
        scratch: vec![1, 2, 3],
        total_ascent: 340,
        grade: Some(-4),
        ratio: 0.5,
    }
}

#[test]
fn message_number() {
    assert_eq!(Lap::NUMBER, 19);
}

#[test]
fn fields_in_declaration_order() {
    let lap = lap();
    let mut fields = Vec::new();
    lap.fields(|f| fields.push(f));

    assert_eq!(
        fields,
        [
            Field::new(253, Value::UInt32(1_000_000)),
            Field::new(7, Value::Invalid(BaseType::UInt32)),
            Field::new(26, Value::String("Climb")),
            Field::new(13, Value::UInt16(340)),
            Field::new(31, Value::SInt16(-4)),
            Field::new(100, Value::Float32(0.5)),
        ]
    );
}

#[test]
fn written_and_decoded() {
    let mut writer = Writer::new(HeaderLength::Short, StringMode::Variable);
    writer.write(&lap());
    writer.write(&Lap {
        name: None,
        grade: None,
        ..lap()
    });
    let bytes = writer.finish();

    let records = avec::decode_slice(&bytes).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.global == 19));

    let numbers: Vec<u8> = records[0].fields.iter().map(|f| f.number).collect();
    assert_eq!(numbers, [253, 7, 26, 13, 31, 100]);

    assert_eq!(records[0].u32(253), Some(1_000_000));
    assert_eq!(records[0].u32(7), None);
    assert_eq!(records[0].str(26), Some("Climb"));
    assert_eq!(records[0].u16(13), Some(340));
    assert_eq!(records[0].value(31), Some(Value::SInt16(-4)));
    assert_eq!(records[0].value(100), Some(Value::Float32(0.5)));

    assert_eq!(records[1].str(26), None);
    assert_eq!(records[1].value(31), None);
    assert_eq!(records[1].u16(13), Some(340));
}
