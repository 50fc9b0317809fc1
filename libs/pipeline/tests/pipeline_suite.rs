//! End-to-end tests for the standard transformation pipeline

use serde_json::json;

use cuprum_models::{
    AttributeDeclaration, ContextAttribute, ContextEntity, ExpressionDialect, Measurement,
    TypeInformation,
};
use cuprum_pipeline::{Error, Pipeline, PipelineBuilder, PipelineConfig, Transform};

fn standard() -> Pipeline {
    PipelineBuilder::standard(&PipelineConfig::default()).build()
}

#[test]
fn aliased_expression_attribute_end_to_end() {
    // Wire sample p="52" becomes pressure=1040: alias rename, string
    // coercion, then the declared expression.
    let mut info = TypeInformation::new("WeatherStation");
    info.active.push(
        AttributeDeclaration::new("pressure", "Number")
            .with_object_id("p")
            .with_expression("${@pressure * 20}"),
    );

    let measurements = vec![Measurement {
        name: "pressure".into(),
        measurement_type: "string".into(),
        value: json!("52"),
        object_id: Some("p".into()),
    }];

    let out = standard()
        .update("ws4", "WeatherStation", &measurements, &info)
        .unwrap();
    assert_eq!(out.len(), 1);

    let pressure = out[0].attribute("pressure").unwrap();
    assert_eq!(pressure.attribute_type, "Number");
    assert_eq!(pressure.value, json!(1040));
}

#[test]
fn multi_entity_fan_out_with_computed_identifier() {
    let mut info = TypeInformation::new("WeatherStation");
    info.active.push(AttributeDeclaration::new("pressure", "Number").with_object_id("p"));
    info.active.push(
        AttributeDeclaration::new("humidity", "Number")
            .with_object_id("h")
            .with_entity("Station Number ${@sn * 10}", Some("Higrometer".to_string())),
    );
    info.active.push(AttributeDeclaration::new("sn", "Number"));

    let measurements = vec![
        Measurement::new("p", "string", json!("52")),
        Measurement::new("h", "string", json!("12")),
        Measurement::new("sn", "string", json!("5")),
    ];

    let out = standard()
        .update("ws4", "WeatherStation", &measurements, &info)
        .unwrap();
    assert_eq!(out.len(), 2);

    // Primary keeps everything without an entity_name.
    assert_eq!(out[0].id, "ws4");
    assert!(out[0].attribute("pressure").is_some());
    assert!(out[0].attribute("sn").is_some());
    assert!(out[0].attribute("humidity").is_none());

    // The fanned-out attribute lands on the computed entity.
    assert_eq!(out[1].id, "Station Number 50");
    assert_eq!(out[1].entity_type, "Higrometer");
    assert_eq!(out[1].attribute("humidity").unwrap().value, json!(12));
}

#[test]
fn compressed_timestamps_round_trip() {
    let mut info = TypeInformation::new("WeatherStation");
    info.active
        .push(AttributeDeclaration::new("measured", "ISO8601").with_object_id("m"));

    let measurements = vec![Measurement::new("m", "ISO8601", json!("20071103T131805"))];

    let pipeline = standard();
    let out = pipeline
        .update("ws4", "WeatherStation", &measurements, &info)
        .unwrap();
    assert_eq!(
        out[0].attribute("measured").unwrap().value,
        json!("+002007-11-03T13:18:05")
    );

    // The query direction applies the inverse rewrite to a response.
    let mut response = ContextEntity::new("ws4", "WeatherStation");
    response.set_attribute(ContextAttribute::new(
        "measured",
        "ISO8601",
        json!("+002007-11-03T13:18:05"),
    ));
    let back = pipeline.query(response, &info).unwrap();
    assert_eq!(
        back.attribute("measured").unwrap().value,
        json!("20071103T131805")
    );
}

#[test]
fn time_instant_propagates_when_the_type_opts_in() {
    let mut info = TypeInformation::new("WeatherStation");
    info.timestamp = true;
    info.active.push(AttributeDeclaration::new("pressure", "Number"));
    info.active.push(AttributeDeclaration::new("TimeInstant", "DateTime"));

    let measurements = vec![
        Measurement::new("pressure", "Number", json!("52")),
        Measurement::new("TimeInstant", "DateTime", json!("2007-11-03T13:18:05.000Z")),
    ];

    let out = standard()
        .update("ws4", "WeatherStation", &measurements, &info)
        .unwrap();
    let pressure = out[0].attribute("pressure").unwrap();
    let meta = pressure.metadata.get("TimeInstant").unwrap();
    assert_eq!(meta.metadata_type, "DateTime");
    assert_eq!(meta.value, json!("2007-11-03T13:18:05.000Z"));
}

#[test]
fn static_attributes_ride_along() {
    let mut info = TypeInformation::new("WeatherStation");
    info.static_attributes.push(ContextAttribute::new(
        "location",
        "geo:point",
        json!("40.4, -3.7"),
    ));

    let out = standard()
        .update("ws4", "WeatherStation", &[], &info)
        .unwrap();
    assert_eq!(
        out[0].attribute("location").unwrap().value,
        json!("40.4, -3.7")
    );
}

#[test]
fn jexl_device_type_selects_its_dialect() {
    // The agent-wide default stays legacy; this type opts into jexl.
    let mut info = TypeInformation::new("Light");
    info.expression_language = Some(ExpressionDialect::Jexl);
    info.active.push(AttributeDeclaration::new("luminosity", "Number").with_object_id("l"));
    info.active.push(
        AttributeDeclaration::new("doubled", "Number").with_expression("luminosity * 2"),
    );

    let measurements = vec![Measurement::new("l", "string", json!("21"))];

    let out = standard().update("light1", "Light", &measurements, &info).unwrap();
    assert_eq!(out[0].attribute("doubled").unwrap().value, json!(42));
}

#[test]
fn malformed_structured_value_degrades_without_error() {
    let mut info = TypeInformation::new("Tracker");
    info.active.push(AttributeDeclaration::new("path", "Object").with_object_id("o"));

    let measurements = vec![Measurement::new("o", "Object", json!("{broken"))];

    let out = standard().update("t1", "Tracker", &measurements, &info).unwrap();
    assert_eq!(out[0].attribute("path").unwrap().value, json!("{broken"));
}

#[test]
fn expression_failure_aborts_the_whole_update() {
    let mut info = TypeInformation::new("WeatherStation");
    info.active.push(
        AttributeDeclaration::new("pressure", "Number")
            .with_object_id("p")
            .with_expression("${@pressure * }"),
    );

    let measurements = vec![Measurement::new("p", "string", json!("52"))];

    let err = standard()
        .update("ws4", "WeatherStation", &measurements, &info)
        .unwrap_err();
    assert!(matches!(err, Error::AttributeExpression { .. }));
}

struct TagEntities;

impl Transform for TagEntities {
    fn name(&self) -> &'static str {
        "tag-entities"
    }

    fn apply(
        &self,
        mut entities: Vec<ContextEntity>,
        _info: &TypeInformation,
    ) -> cuprum_pipeline::Result<Vec<ContextEntity>> {
        for entity in &mut entities {
            entity.set_attribute(ContextAttribute::new("tagged", "Boolean", json!(true)));
        }
        Ok(entities)
    }
}

#[test]
fn custom_transforms_compose_with_the_built_ins() {
    let mut info = TypeInformation::new("WeatherStation");
    info.active.push(AttributeDeclaration::new("pressure", "Number").with_object_id("p"));

    let pipeline = PipelineBuilder::standard(&PipelineConfig::default())
        .add_update_transform(TagEntities)
        .build();

    let measurements = vec![Measurement::new("p", "string", json!("52"))];
    let out = pipeline
        .update("ws4", "WeatherStation", &measurements, &info)
        .unwrap();
    assert_eq!(out[0].attribute("pressure").unwrap().value, json!(52));
    assert_eq!(out[0].attribute("tagged").unwrap().value, json!(true));
}
