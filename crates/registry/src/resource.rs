use rekt_types::{ResourceBlock, ResourceDefinition, Verb};
use tracing::warn;
use url::Url;

use crate::{DefinitionError, schema_builder::build_request_schema};

/// Assembles the definition of one resource.
///
/// Every [`Verb`] present in `block` contributes a request schema and a
/// response descriptor; verbs that are missing (or declared as `null`) are
/// simply unsupported. The resource URL is `base_url` followed by the block's
/// `url`, concatenated as-is: duplicate slashes are not collapsed.
///
/// # Errors
///
/// Propagates schema errors and returns [`DefinitionError::InvalidUrl`] when
/// the joined URL cannot be parsed.
pub fn create_resource_definition(
    name: &str,
    block: &ResourceBlock,
    base_url: &str,
) -> Result<ResourceDefinition, DefinitionError> {
    for key in block.sections.keys() {
        if !Verb::ALL.iter().any(|verb| verb.as_str() == key) {
            warn!(resource = %name, key = %key, "ignoring unrecognized key in resource definition");
        }
    }

    let mut request_schemas = Vec::new();
    for verb in Verb::ALL {
        let Some(section) = block.verb_section(verb) else {
            continue;
        };
        request_schemas.push((verb, build_request_schema(name, verb, section)?));
    }

    let url = format!("{}{}", base_url, block.url);
    if let Err(source) = Url::parse(&url) {
        return Err(DefinitionError::InvalidUrl {
            resource: name.to_string(),
            url,
            source,
        });
    }

    Ok(ResourceDefinition::new(name, url, request_schemas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::{Value, json};

    fn block(url: &str, sections: Value) -> ResourceBlock {
        let sections: IndexMap<String, Value> = serde_json::from_value(sections).expect("sections");
        ResourceBlock {
            url: url.to_string(),
            sections,
        }
    }

    #[test]
    fn joins_url_and_collects_declared_verbs() {
        let block = block(
            "/details/json",
            json!({
                "POST": { "body": null },
                "GET": { "key": null, "placeid": null },
            }),
        );
        let resource = create_resource_definition("Details", &block, "https://maps.example.com/api").expect("resource");

        assert_eq!(resource.url, "https://maps.example.com/api/details/json");
        assert_eq!(resource.supported_verbs().collect::<Vec<_>>(), vec![Verb::Get, Verb::Post]);
        assert_eq!(
            resource.request_schema(Verb::Get).map(|schema| schema.names().collect::<Vec<_>>()),
            Some(vec!["key", "placeid"])
        );
        assert_eq!(
            resource.response_descriptor(Verb::Get).map(|descriptor| descriptor.type_name.as_str()),
            Some("GetDetailsResponse")
        );
    }

    #[test]
    fn duplicate_slashes_are_preserved() {
        let block = block("/search", json!({ "GET": {} }));
        let resource = create_resource_definition("Search", &block, "https://example.com/").expect("resource");
        assert_eq!(resource.url, "https://example.com//search");
    }

    #[test]
    fn null_and_unknown_sections_are_skipped() {
        let block = block("/things", json!({ "GET": null, "get": { "a": null }, "PUT": { "a": null } }));
        let resource = create_resource_definition("Things", &block, "https://example.com").expect("resource");
        assert_eq!(resource.supported_verbs().collect::<Vec<_>>(), vec![Verb::Put]);
    }

    #[test]
    fn unparseable_url_is_rejected() {
        let block = block("/things", json!({ "GET": {} }));
        let error = create_resource_definition("Things", &block, "not a url").expect_err("invalid url");
        assert!(matches!(error, DefinitionError::InvalidUrl { ref resource, .. } if resource == "Things"));
    }
}
