use enricher_core::{
    apply_result, merge_fields, EnrichedFields, EnrichmentResult, Field, FieldNames, FormRecord,
    FormState, ImageRef, NoticeKind, Outcome,
};
use pretty_assertions::assert_eq;

fn full_fields() -> EnrichedFields {
    EnrichedFields {
        manufacturer: Some("Good Smile".to_string()),
        name: Some("Miku".to_string()),
        scale: Some("1/7".to_string()),
        image_url: Some("https://static.example/miku.jpg".to_string()),
    }
}

#[test]
fn empty_record_receives_fetched_fields() {
    let names = FieldNames::default();
    let mut record = FormRecord::new();
    let result = EnrichmentResult::populated(EnrichedFields {
        manufacturer: Some("Good Smile".to_string()),
        name: Some("Miku".to_string()),
        ..EnrichedFields::default()
    });

    let outcome = apply_result(&result, &mut record, &names);

    assert_eq!(outcome, Outcome::PartialMerge(2));
    assert_eq!(record.get_field("manufacturer"), Some("Good Smile"));
    assert_eq!(record.get_field("name"), Some("Miku"));
    assert_eq!(record.get_field("scale"), None);
}

#[test]
fn filled_fields_are_never_overwritten() {
    let names = FieldNames::default();
    let mut record = FormRecord::new()
        .with_field("manufacturer", "Max Factory")
        .with_field("name", "  ")
        .with_field("scale", "");

    let report = merge_fields(&full_fields(), &mut record, &names);

    assert_eq!(report.populated, vec![Field::Name, Field::Scale, Field::ImageUrl]);
    assert_eq!(record.get_field("manufacturer"), Some("Max Factory"));
    assert_eq!(record.get_field("name"), Some("Miku"));
    assert_eq!(record.get_field("scale"), Some("1/7"));
}

#[test]
fn full_record_is_left_untouched() {
    let names = FieldNames::default();
    let mut record = FormRecord::new()
        .with_field("manufacturer", "Alter")
        .with_field("name", "Saber")
        .with_field("scale", "1/8")
        .with_field("imageUrl", "https://static.example/saber.jpg");
    let before = record.clone();

    let outcome = apply_result(&EnrichmentResult::populated(full_fields()), &mut record, &names);

    assert_eq!(outcome, Outcome::NoOpMerge);
    assert_eq!(record, before);
    assert_eq!(outcome.notice().map(|n| n.kind), Some(NoticeKind::Info));
}

#[test]
fn manual_extract_image_is_written_verbatim() {
    let names = FieldNames::default();
    let mut record = FormRecord::new();
    let raw = "MANUAL_EXTRACT:image is behind a login wall";
    let result = EnrichmentResult::populated(EnrichedFields {
        image_url: Some(raw.to_string()),
        ..EnrichedFields::default()
    });

    let outcome = apply_result(&result, &mut record, &names);

    assert_eq!(outcome, Outcome::PartialMerge(1));
    assert_eq!(record.get_field("imageUrl"), Some(raw));
    let image = result.fields.image().expect("image value");
    assert_eq!(image.reason(), Some("image is behind a login wall"));
    assert_eq!(image.to_wire(), raw);
    assert_eq!(
        ImageRef::parse("https://static.example/a.jpg"),
        ImageRef::Populated("https://static.example/a.jpg".to_string())
    );
}

#[test]
fn custom_field_names_are_honoured() {
    let names = FieldNames {
        manufacturer: "maker".to_string(),
        image_url: "photo".to_string(),
        ..FieldNames::default()
    };
    let mut record = FormRecord::new();

    merge_fields(&full_fields(), &mut record, &names);

    assert_eq!(record.get_field("maker"), Some("Good Smile"));
    assert_eq!(record.get_field("photo"), Some("https://static.example/miku.jpg"));
    assert_eq!(record.get_field("manufacturer"), None);
}

#[test]
fn unsuccessful_or_empty_results_do_not_merge() {
    let names = FieldNames::default();
    let mut record = FormRecord::new();

    let outcome = apply_result(
        &EnrichmentResult::failed(Some("Item not found".to_string())),
        &mut record,
        &names,
    );
    assert_eq!(outcome, Outcome::ServerError(Some("Item not found".to_string())));
    assert_eq!(outcome.notice().map(|n| n.text), Some("Item not found".to_string()));

    let blank = EnrichmentResult::populated(EnrichedFields {
        name: Some("   ".to_string()),
        ..EnrichedFields::default()
    });
    assert_eq!(apply_result(&blank, &mut record, &names), Outcome::EmptyResult);
    assert_eq!(record, FormRecord::new());
}

#[test]
fn notices_match_outcomes() {
    assert_eq!(Outcome::Cancelled.notice(), None);
    assert_eq!(Outcome::ValidationRejected.notice(), None);

    let fallback = Outcome::ServerError(None).notice().expect("notice");
    assert_eq!(fallback.kind, NoticeKind::Error);
    assert!(!fallback.text.is_empty());

    let one = Outcome::PartialMerge(1).notice().expect("notice");
    assert_eq!(one.kind, NoticeKind::Success);
    assert_eq!(one.text, "Filled in 1 field from the link.");
    assert_eq!(
        Outcome::PartialMerge(3).notice().map(|n| n.text),
        Some("Filled in 3 fields from the link.".to_string())
    );
}
