use chainring::{
    avec::{self, slice::Error, workout::DecodeError, writer::Writer},
    profile::{FileIdMessage, FileType},
    sans::{
        check::compute_crc,
        data::{Message, StringMode, Value},
        header::{DocumentHeader, HeaderLength},
    },
};

/// Wrap hand-assembled records in a short header and a trailing check value.
fn document(records: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0; 12];
    DocumentHeader::new(HeaderLength::Short, records.len() as u32).encode(&mut bytes);
    bytes.extend_from_slice(records);

    let crc = compute_crc(0, &bytes);
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes
}

#[test]
fn big_endian_records() {
    #[rustfmt::skip]
    let bytes = document(&[
        // Definition, local 0: big-endian, global 20, two fields.
        0x40, 0x00, 0x01, 0x00, 0x14, 0x02,
        0x03, 0x02, 0x84, // uint16
        0x04, 0x04, 0x86, // uint32
        // Data, local 0.
        0x00, 0x01, 0x02, 0x00, 0x00, 0x01, 0x00,
    ]);

    let records = avec::decode_slice(&bytes).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].global, 20);
    assert_eq!(records[0].value(3), Some(Value::UInt16(258)));
    assert_eq!(records[0].u32(4), Some(256));
    assert_eq!(records[0].time_offset, None);
}

#[test]
fn compressed_timestamp_headers() {
    #[rustfmt::skip]
    let bytes = document(&[
        // Definition, local 1: little-endian, global 20, one field.
        0x41, 0x00, 0x00, 0x14, 0x00, 0x01,
        0x03, 0x02, 0x84,
        // Compressed header: local 1, time offset 3.
        0xA3, 0x07, 0x00,
        // Compressed header: local 1, time offset 31, invalid value.
        0xBF, 0xFF, 0xFF,
    ]);

    let records = avec::decode_slice(&bytes).unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.global == 20));
    assert_eq!(records[0].time_offset, Some(3));
    assert_eq!(records[0].u16(3), Some(7));
    assert_eq!(records[1].time_offset, Some(31));
    assert_eq!(records[1].u16(3), None);
}

#[test]
fn developer_data_rejected() {
    // Definition header with the developer flag set.
    let bytes = document(&[0x60, 0x00, 0x00, 0x14, 0x00, 0x00]);

    assert!(matches!(avec::decode_slice(&bytes), Err(Error::Developer)));
}

#[test]
fn undefined_local_message() {
    let bytes = document(&[0x05, 0x00]);

    assert!(matches!(
        avec::decode_slice(&bytes),
        Err(Error::UndefinedMessage(5))
    ));
}

#[test]
fn unknown_base_type() {
    #[rustfmt::skip]
    let bytes = document(&[
        0x40, 0x00, 0x00, 0x14, 0x00, 0x01,
        0x01, 0x01, 0x55,
        0x00, 0x00,
    ]);

    assert!(matches!(
        avec::decode_slice(&bytes),
        Err(Error::UnknownBaseType {
            field: 1,
            base_type: 0x55
        })
    ));
}

#[test]
fn record_body_past_end() {
    #[rustfmt::skip]
    let bytes = document(&[
        0x40, 0x00, 0x00, 0x14, 0x00, 0x01,
        0x03, 0x04, 0x86,
        // Two of the four declared bytes.
        0x00, 0x01, 0x02,
    ]);

    assert!(matches!(avec::decode_slice(&bytes), Err(Error::EndOfSlice)));
}

/// A `workout_step` message with raw enumeration values.
#[derive(Message)]
#[message(27)]
struct RawStep {
    #[field(254)]
    index: u16,
    #[field(1)]
    duration_type: u8,
    #[field(2)]
    duration_value: u32,
    #[field(3)]
    target_type: Option<u8>,
    #[field(5)]
    low: Option<u32>,
    #[field(6)]
    high: Option<u32>,
}

impl RawStep {
    fn time(index: u16, target_type: Option<u8>, low: Option<u32>) -> Self {
        Self {
            index,
            duration_type: 0,
            duration_value: 60_000,
            target_type,
            low,
            high: low,
        }
    }
}

fn workout_document(steps: &[RawStep]) -> Vec<u8> {
    let mut writer = Writer::new(HeaderLength::Short, StringMode::Variable);
    writer.write(&FileIdMessage {
        file_type: FileType::Workout,
        manufacturer: 255,
        product: 0,
        serial_number: None,
        time_created: None,
    });

    for step in steps {
        writer.write(step);
    }

    writer.finish()
}

#[test]
fn raw_steps_decode() {
    let bytes = workout_document(&[
        RawStep::time(0, Some(4), Some(90)),
        RawStep::time(1, None, None),
    ]);

    let workout = avec::decode_workout(&bytes).unwrap();

    assert_eq!(workout.name, "");
    assert_eq!(workout.steps.len(), 2);
    assert_eq!(workout.steps[0].duration_seconds, 60);
    assert_eq!(workout.steps[0].power_low(), Some(90));
    assert_eq!(workout.steps[1].power(), None);
}

#[test]
fn unsupported_duration() {
    let mut step = RawStep::time(0, Some(4), Some(90));
    // Distance.
    step.duration_type = 1;

    assert!(matches!(
        avec::decode_workout(&workout_document(&[step])),
        Err(DecodeError::UnsupportedDuration {
            index: 0,
            duration_type: Some(1)
        })
    ));
}

#[test]
fn unsupported_targets() {
    // Absolute watts.
    let watts = workout_document(&[RawStep::time(0, Some(4), Some(1250))]);
    assert!(matches!(
        avec::decode_workout(&watts),
        Err(DecodeError::UnsupportedTarget {
            index: 0,
            target_type: Some(4)
        })
    ));

    // Speed.
    let speed = workout_document(&[RawStep::time(0, Some(0), Some(10))]);
    assert!(matches!(
        avec::decode_workout(&speed),
        Err(DecodeError::UnsupportedTarget {
            index: 0,
            target_type: Some(0)
        })
    ));

    // Power without bounds.
    let bare = workout_document(&[RawStep::time(0, Some(4), None)]);
    assert!(matches!(
        avec::decode_workout(&bare),
        Err(DecodeError::UnsupportedTarget { .. })
    ));
}

#[test]
fn repeat_out_of_range() {
    let repeat = RawStep {
        index: 1,
        duration_type: 6,
        duration_value: 5,
        target_type: None,
        low: None,
        high: None,
    };

    let bytes = workout_document(&[RawStep::time(0, None, None), repeat]);

    assert!(matches!(
        avec::decode_workout(&bytes),
        Err(DecodeError::RepeatOutOfRange { index: 1, from: 5 })
    ));
}
