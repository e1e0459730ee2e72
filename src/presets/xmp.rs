//! XMP sidecar parser for camera-raw tonal settings.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use color_grade::ToneAdjustments;

use super::PresetError;

/// Kelvin value that maps to a neutral temperature of 0.
const NEUTRAL_KELVIN: f32 = 6500.0;

fn description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<rdf:Description\b([^>]*?)(/?)>").expect("valid regex"))
}

fn attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"crs:(\w+)\s*=\s*"([^"]*)""#).expect("valid regex"))
}

fn element_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<crs:(\w+)>([^<]*)</crs:(\w+)>").expect("valid regex"))
}

/// Collect `crs:*` settings from the first `rdf:Description` node.
///
/// Both attribute form (`crs:Exposure2012="+0.50"`) and element form
/// (`<crs:Exposure2012>0.50</crs:Exposure2012>`) are read. Attributes win
/// over elements of the same name.
fn description_settings(text: &str) -> Result<HashMap<String, String>, PresetError> {
    let caps = description_re()
        .captures(text)
        .ok_or(PresetError::MissingDescription)?;

    let mut settings = HashMap::new();

    let self_closing = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
    if !self_closing {
        let start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let rest = &text[start..];
        let body = rest
            .find("</rdf:Description>")
            .map(|end| &rest[..end])
            .unwrap_or(rest);
        for el in element_re().captures_iter(body) {
            if el[1] == el[3] {
                settings.insert(el[1].to_string(), el[2].trim().to_string());
            }
        }
    }

    let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    for attr in attribute_re().captures_iter(attrs) {
        settings.insert(attr[1].to_string(), attr[2].to_string());
    }

    Ok(settings)
}

/// Look up the first present name and coerce it to a number.
fn number(
    settings: &HashMap<String, String>,
    names: &[&'static str],
) -> Result<Option<f32>, PresetError> {
    for name in names {
        if let Some(raw) = settings.get(*name) {
            let trimmed = raw.trim();
            let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
            return digits
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| PresetError::InvalidValue {
                    field: *name,
                    value: raw.clone(),
                });
        }
    }
    Ok(None)
}

/// Parse an XMP preset into [`ToneAdjustments`].
///
/// Missing settings stay neutral. `Temperature` is read in Kelvin and mapped
/// to the slider scale as `(kelvin - 6500) / 100`, clamped to +/-100.
pub fn parse_xmp(text: &str) -> Result<ToneAdjustments, PresetError> {
    let s = description_settings(text)?;
    let get = |names: &[&'static str]| number(&s, names).map(|v| v.unwrap_or(0.0));

    let temperature = number(&s, &["Temperature"])?
        .map(|kelvin| ((kelvin - NEUTRAL_KELVIN) / 100.0).clamp(-100.0, 100.0))
        .unwrap_or(0.0);

    Ok(ToneAdjustments {
        exposure: get(&["Exposure2012", "Exposure"])?,
        contrast: get(&["Contrast2012", "Contrast"])?,
        highlights: get(&["Highlights2012", "Highlights"])?,
        shadows: get(&["Shadows2012", "Shadows"])?,
        whites: get(&["Whites2012", "Whites"])?,
        blacks: get(&["Blacks2012", "Blacks"])?,
        vibrance: get(&["Vibrance"])?,
        saturation: get(&["Saturation"])?,
        temperature,
        tint: get(&["Tint"])?,
        clarity: get(&["Clarity2012", "Clarity"])?,
        dehaze: get(&["Dehaze"])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATTRIBUTE_PRESET: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/"
    crs:PresetType="Normal"
    crs:Exposure2012="+0.50"
    crs:Contrast2012="-10"
    crs:Highlights2012="-40"
    crs:Shadows2012="+35"
    crs:Whites2012="+5"
    crs:Blacks2012="-8"
    crs:Vibrance="+20"
    crs:Saturation="-5"
    crs:Temperature="7300"
    crs:Tint="+6"
    crs:Clarity2012="+12"
    crs:Dehaze="+3">
   <crs:Name>
    <rdf:Alt><rdf:li xml:lang="x-default">Warm Film</rdf:li></rdf:Alt>
   </crs:Name>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>"#;

    #[test]
    fn test_parse_attribute_form() {
        let adj = parse_xmp(ATTRIBUTE_PRESET).unwrap();
        assert_eq!(
            adj,
            ToneAdjustments {
                exposure: 0.5,
                contrast: -10.0,
                highlights: -40.0,
                shadows: 35.0,
                whites: 5.0,
                blacks: -8.0,
                vibrance: 20.0,
                saturation: -5.0,
                temperature: 8.0,
                tint: 6.0,
                clarity: 12.0,
                dehaze: 3.0,
            }
        );
    }

    #[test]
    fn test_parse_element_form() {
        let text = r#"<rdf:RDF><rdf:Description rdf:about="">
            <crs:Exposure2012>-1.25</crs:Exposure2012>
            <crs:Saturation>+30</crs:Saturation>
        </rdf:Description></rdf:RDF>"#;
        let adj = parse_xmp(text).unwrap();
        assert_eq!(adj.exposure, -1.25);
        assert_eq!(adj.saturation, 30.0);
        assert_eq!(adj.contrast, 0.0);
    }

    #[test]
    fn test_missing_settings_are_neutral() {
        let adj = parse_xmp(r#"<rdf:Description rdf:about=""/>"#).unwrap();
        assert!(adj.is_neutral());
    }

    #[test]
    fn test_legacy_names_are_fallbacks() {
        let text = r#"<rdf:Description crs:Exposure="+0.30" crs:Exposure2012="+0.70"
            crs:Contrast="+25"/>"#;
        let adj = parse_xmp(text).unwrap();
        assert_eq!(adj.exposure, 0.7);
        assert_eq!(adj.contrast, 25.0);
    }

    #[test]
    fn test_temperature_kelvin_conversion() {
        let cool = parse_xmp(r#"<rdf:Description crs:Temperature="5000"/>"#).unwrap();
        assert_eq!(cool.temperature, -15.0);

        let neutral = parse_xmp(r#"<rdf:Description crs:Temperature="6500"/>"#).unwrap();
        assert_eq!(neutral.temperature, 0.0);

        let extreme = parse_xmp(r#"<rdf:Description crs:Temperature="50000"/>"#).unwrap();
        assert_eq!(extreme.temperature, 100.0);
    }

    #[test]
    fn test_missing_description_rejected() {
        let err = parse_xmp("<x:xmpmeta></x:xmpmeta>").unwrap_err();
        assert!(matches!(err, PresetError::MissingDescription));
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let err = parse_xmp(r#"<rdf:Description crs:Tint="green"/>"#).unwrap_err();
        assert!(matches!(
            err,
            PresetError::InvalidValue { field: "Tint", .. }
        ));
    }

    #[test]
    fn test_only_first_description_is_read() {
        let text = r#"<rdf:Description crs:Vibrance="+10"/>
            <rdf:Description crs:Vibrance="+90"/>"#;
        assert_eq!(parse_xmp(text).unwrap().vibrance, 10.0);
    }
}
