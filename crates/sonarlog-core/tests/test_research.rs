mod common;

use std::io::Cursor;

use sonarlog_core::consts::{LOG_HEADER_SIZE, SL2_FRAME_HEADER_SIZE};
use sonarlog_core::error::SonarError;
use sonarlog_core::frame::Channel;
use sonarlog_core::io::lowrance::{parse_log, FileVersion};
use sonarlog_core::research::{research_file, ResearchOutcome, ValueResearch};

use common::{build_log, sounded_frame, track, write_test_log};

/// SL2 frame index field offset.
const SL2_INDEX_OFFSET: usize = 36;

#[test]
fn test_reads_offset_in_every_record() {
    let frames = track(&[Channel::Primary, Channel::DownScan], 4);
    let bytes = build_log(FileVersion::Sl2, &frames);

    let outcome = ResearchOutcome::collect(ValueResearch::new(
        Cursor::new(bytes),
        LOG_HEADER_SIZE,
        SL2_INDEX_OFFSET,
        FileVersion::Sl2,
    ));

    assert!(outcome.truncated.is_none());
    assert_eq!(outcome.entries.len(), 8);
    let record_size = (SL2_FRAME_HEADER_SIZE + 16) as u64;
    for (i, (entry, frame)) in outcome.entries.iter().zip(&frames).enumerate() {
        assert_eq!(entry.record_offset, LOG_HEADER_SIZE as u64 + i as u64 * record_size);
        assert_eq!(entry.value.as_i32, frame.index as i32);
        assert_eq!(entry.value.frame_index, frame.index);
        assert_eq!(entry.value.channel, frame.channel);
    }
}

#[test]
fn test_reads_sounded_data_bytes() {
    let frames = vec![sounded_frame(
        Channel::Primary,
        3,
        55.0,
        37.0,
        b"SONAR!".to_vec(),
    )];
    let bytes = build_log(FileVersion::Sl3, &frames);
    let offset = FileVersion::Sl3.frame_header_size();

    let outcome = ResearchOutcome::collect(ValueResearch::new(
        Cursor::new(bytes),
        LOG_HEADER_SIZE,
        offset,
        FileVersion::Sl3,
    ));

    assert_eq!(outcome.entries.len(), 1);
    let value = &outcome.entries[0].value;
    assert_eq!(value.as_string, "SONA");
    assert_eq!(value.raw_bytes, *b"SONA");
    assert_eq!(value.hex(), "53-4F-4E-41");
}

#[test]
fn test_truncated_source_keeps_earlier_entries() {
    let frames = track(&[Channel::Primary], 5);
    let mut bytes = build_log(FileVersion::Sl2, &frames);
    bytes.truncate(bytes.len() - 3);

    let mut research = ValueResearch::new(
        Cursor::new(bytes),
        LOG_HEADER_SIZE,
        SL2_INDEX_OFFSET,
        FileVersion::Sl2,
    );
    let mut entries = Vec::new();
    let mut failure = None;
    for item in research.by_ref() {
        match item {
            Ok(entry) => entries.push(entry),
            Err(e) => failure = Some(e),
        }
    }

    assert_eq!(entries.len(), 4);
    match failure {
        Some(SonarError::TruncatedSource { needed, available, .. }) => {
            assert_eq!(needed, SL2_FRAME_HEADER_SIZE + 16);
            assert_eq!(available, SL2_FRAME_HEADER_SIZE + 13);
        }
        other => panic!("expected truncated source, got {other:?}"),
    }
    assert!(research.next().is_none());
}

#[test]
fn test_records_shorter_than_offset_are_skipped() {
    let frames = track(&[Channel::Primary], 3);
    let bytes = build_log(FileVersion::Sl2, &frames);

    let outcome = ResearchOutcome::collect(ValueResearch::new(
        Cursor::new(bytes),
        LOG_HEADER_SIZE,
        SL2_FRAME_HEADER_SIZE + 14,
        FileVersion::Sl2,
    ));

    assert!(outcome.entries.is_empty());
    assert!(outcome.truncated.is_none());
}

#[test]
fn test_mixed_record_sizes() {
    let frames = vec![
        sounded_frame(Channel::Primary, 0, 55.0, 37.0, vec![1; 64]),
        sounded_frame(Channel::DownScan, 0, 55.0, 37.0, vec![2; 8]),
        sounded_frame(Channel::Primary, 1, 55.0001, 37.0, vec![3; 64]),
        sounded_frame(Channel::Primary, 2, 55.0002, 37.0, vec![4; 64]),
    ];
    let bytes = build_log(FileVersion::Sl2, &frames);

    let outcome = ResearchOutcome::collect(ValueResearch::new(
        Cursor::new(bytes),
        LOG_HEADER_SIZE,
        SL2_FRAME_HEADER_SIZE + 32,
        FileVersion::Sl2,
    ));

    assert!(outcome.truncated.is_none());
    let long = (SL2_FRAME_HEADER_SIZE + 64) as u64;
    let short = (SL2_FRAME_HEADER_SIZE + 8) as u64;
    let offsets: Vec<u64> = outcome.entries.iter().map(|e| e.record_offset).collect();
    let header = LOG_HEADER_SIZE as u64;
    assert_eq!(
        offsets,
        vec![header, header + long + short, header + 2 * long + short]
    );
    let payload: Vec<u8> = outcome.entries.iter().map(|e| e.value.raw_bytes[0]).collect();
    assert_eq!(payload, vec![1, 3, 4]);
    assert!(outcome
        .entries
        .iter()
        .all(|e| e.value.channel == Channel::Primary));
}

#[test]
fn test_walks_records_like_the_log_reader() {
    let frames = vec![
        sounded_frame(Channel::Primary, 10, 55.0, 37.0, vec![1; 32]),
        sounded_frame(Channel::DownScan, 11, 55.0, 37.0, vec![2; 16]),
        sounded_frame(Channel::Primary, 12, 55.0001, 37.0, vec![3; 32]),
    ];
    let mut bytes = build_log(FileVersion::Sl2, &frames);
    // Declare the first block smaller than its header plus sounded data.
    let block_size_field = LOG_HEADER_SIZE + 28;
    bytes[block_size_field..block_size_field + 2]
        .copy_from_slice(&(SL2_FRAME_HEADER_SIZE as u16).to_le_bytes());

    let parsed = parse_log(&bytes).unwrap();
    let outcome = ResearchOutcome::collect(ValueResearch::new(
        Cursor::new(bytes),
        LOG_HEADER_SIZE,
        SL2_INDEX_OFFSET,
        FileVersion::Sl2,
    ));

    assert!(outcome.truncated.is_none());
    let researched: Vec<u32> = outcome.entries.iter().map(|e| e.value.frame_index).collect();
    let read: Vec<u32> = parsed.frames.iter().map(|f| f.index).collect();
    assert_eq!(researched, vec![10, 11, 12]);
    assert_eq!(researched, read);
}

#[test]
fn test_research_file() {
    let frames = track(&[Channel::Primary, Channel::SidescanComposite], 3);
    let file = write_test_log(&build_log(FileVersion::Sl2, &frames));

    let outcome = research_file(file.path(), SL2_INDEX_OFFSET).unwrap();
    assert!(outcome.truncated.is_none());
    let indices: Vec<i32> = outcome.entries.iter().map(|e| e.value.as_i32).collect();
    assert_eq!(indices, vec![0, 0, 1, 1, 2, 2]);
}

#[test]
fn test_research_file_rejects_unknown_header() {
    let file = write_test_log(&[1, 0, 0, 0, 0, 0, 0, 0]);
    assert!(matches!(
        research_file(file.path(), 0),
        Err(SonarError::UnsupportedVersion(1))
    ));
}
