//! XML and property-list targets
//!
//! gedit, Sublime Text, Bluefish, Espresso, Kate and TextMate bundles.

use super::{cdata, xml_attr};
use crate::format::{
    empty, no_companions, stable_uuid, BodySource, Companion, FormatDescriptor, Layout,
    RenderedSnippet, TargetContext,
};
use crate::placeholder::RewriteOp;
use crate::wrap::{escape_xml, WrapOp};

pub const GEDIT: FormatDescriptor = FormatDescriptor {
    name: "gedit",
    description: "gedit snippets XML",
    file_extension: "xml",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::Indent(6)],
    final_marker: Some("$0"),
    separator: "",
    preamble: gedit_preamble,
    postamble: snippets_close,
    record_template: gedit_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn gedit_preamble(target: &TargetContext) -> String {
    format!(
        "<?xml version='1.0' encoding='utf-8'?>\n<snippets language=\"{}\">\n",
        xml_attr(&target.language)
    )
}

fn gedit_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "  <snippet>\n    <tag>{}</tag>\n    <description>{}</description>\n    <text>{}</text>\n  </snippet>\n",
        escape_xml(s.trigger()),
        escape_xml(s.caption()),
        cdata(s.body)
    )
}

fn snippets_close(_: &TargetContext) -> String {
    "</snippets>\n".to_string()
}

pub const SUBLIME: FormatDescriptor = FormatDescriptor {
    name: "sublime",
    description: "Sublime Text .sublime-snippet files",
    file_extension: "sublime-snippet",
    layout: Layout::PerSnippet,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: Some("${0}"),
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: sublime_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn sublime_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "<snippet>\n    <content>{}</content>\n    <tabTrigger>{}</tabTrigger>\n    <scope>{}</scope>\n    <description>{}</description>\n</snippet>\n",
        cdata(&format!("\n{}\n", s.body)),
        escape_xml(s.trigger()),
        escape_xml(&s.target.scope),
        escape_xml(s.caption())
    )
}

/// Bluefish snippet menu. Bluefish has no tab stops, so stops are flattened.
pub const BLUEFISH: FormatDescriptor = FormatDescriptor {
    name: "bluefish",
    description: "Bluefish snippets menu",
    file_extension: "",
    layout: Layout::Aggregate,
    path_template: "snippets",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::EscapeXml],
    final_marker: None,
    separator: "",
    preamble: bluefish_preamble,
    postamble: bluefish_postamble,
    record_template: bluefish_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn bluefish_preamble(target: &TargetContext) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<snippets>\n<branch title=\"{}\">\n",
        xml_attr(&target.language_title())
    )
}

fn bluefish_postamble(_: &TargetContext) -> String {
    "</branch>\n</snippets>\n".to_string()
}

fn bluefish_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "<leaf type=\"insert\" title=\"{}\" tooltip=\"{}\">\n<before>{}</before>\n<after/>\n</leaf>\n",
        xml_attr(s.trigger()),
        xml_attr(s.caption()),
        s.body
    )
}

pub const ESPRESSO: FormatDescriptor = FormatDescriptor {
    name: "espresso",
    description: "Espresso action recipes",
    file_extension: "xml",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::Indent(12)],
    final_marker: Some("${0}"),
    separator: "\n",
    preamble: espresso_preamble,
    postamble: espresso_postamble,
    record_template: espresso_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn espresso_preamble(_: &TargetContext) -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<action-recipes>\n\n".to_string()
}

fn espresso_postamble(_: &TargetContext) -> String {
    "</action-recipes>\n".to_string()
}

fn espresso_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "    <snippet id=\"{}\" category=\"{}\">\n        <title>{}</title>\n        <text>{}</text>\n        <syntax-context>{}</syntax-context>\n    </snippet>\n",
        xml_attr(s.trigger()),
        xml_attr(&s.record.category),
        escape_xml(s.caption()),
        cdata(s.body),
        escape_xml(&s.target.scope)
    )
}

/// Kate snippet repository. Stops are flattened and `%cursor%` marks the final position.
pub const KATE: FormatDescriptor = FormatDescriptor {
    name: "kate",
    description: "Kate snippet repository XML",
    file_extension: "xml",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::Indent(1), WrapOp::EscapeXml],
    final_marker: Some("%cursor%"),
    separator: "",
    preamble: kate_preamble,
    postamble: snippets_close,
    record_template: kate_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn kate_preamble(target: &TargetContext) -> String {
    format!(
        "<snippets namespace=\"\" license=\"GPL v3+\" filetypes=\"{}\" authors=\"\" name=\"{} Snippets\">\n <script></script>\n",
        xml_attr(&target.language),
        xml_attr(&target.language_title())
    )
}

fn kate_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        " <item>\n  <displayprefix></displayprefix>\n  <match>{}</match>\n  <displaypostfix></displaypostfix>\n  <displayarguments></displayarguments>\n  <fillin>{}</fillin>\n </item>\n",
        escape_xml(s.trigger()),
        s.body
    )
}

/// TextMate bundle: one `.tmSnippet` plist per snippet plus the bundle manifest.
pub const TEXTMATE: FormatDescriptor = FormatDescriptor {
    name: "textmate",
    description: "TextMate bundle snippets",
    file_extension: "tmSnippet",
    layout: Layout::PerSnippet,
    path_template: "{Language}.tmbundle/Snippets/{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::EscapeXml],
    final_marker: Some("$0"),
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: textmate_record,
    category_open: None,
    category_close: None,
    companions: textmate_bundle,
};

const PLIST_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">
<plist version=\"1.0\">
<dict>";

const PLIST_FOOTER: &str = "</dict>\n</plist>\n";

const TEXTMATE_DEPENDENCIES: &str = "{
    \"*\": {
        \"*\": [
            \"pygments\"
        ]
    }
}
";

fn textmate_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "{PLIST_HEADER}\n\t<key>content</key>\n\t<string>{}</string>\n\t<key>name</key>\n\t<string>{}</string>\n\t<key>scope</key>\n\t<string>{}</string>\n\t<key>tabTrigger</key>\n\t<string>{}</string>\n\t<key>uuid</key>\n\t<string>{}</string>\n{PLIST_FOOTER}",
        s.body,
        escape_xml(s.caption()),
        escape_xml(&s.target.scope),
        escape_xml(s.trigger()),
        upper_uuid(s.uuid())
    )
}

fn upper_uuid(uuid: uuid::Uuid) -> String {
    uuid.hyphenated().to_string().to_uppercase()
}

fn textmate_bundle(target: &TargetContext, _: &[RenderedSnippet<'_>]) -> Vec<Companion> {
    let bundle = format!("{}.tmbundle", target.language_title());
    let info = format!(
        "{PLIST_HEADER}\n\t<key>name</key>\n\t<string>{}</string>\n\t<key>uuid</key>\n\t<string>{}</string>\n{PLIST_FOOTER}",
        escape_xml(&target.language_title()),
        upper_uuid(stable_uuid(&target.scope, &bundle))
    );
    vec![
        Companion {
            path: format!("{bundle}/info.plist").into(),
            contents: info,
        },
        Companion {
            path: format!("{bundle}/dependencies.json").into(),
            contents: TEXTMATE_DEPENDENCIES.to_string(),
        },
    ]
}

pub fn descriptors() -> Vec<FormatDescriptor> {
    vec![GEDIT, SUBLIME, BLUEFISH, ESPRESSO, KATE, TEXTMATE]
}
