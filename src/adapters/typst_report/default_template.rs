//! Built-in Typst report template with `{{PLACEHOLDER}}` markers.

const TEMPLATE: &str = r#"#set page(paper: "a4", margin: 2cm)
#set text(size: 10pt)

= {{TITLE}}

{{DESCRIPTION}}

== Simulation Inputs

{{INPUTS_TABLE}}

== Results

{{SUMMARY_TABLE}}

=== Exits by Reason

{{EXIT_BREAKDOWN}}

== Per-Ticker Summary

{{TICKER_SUMMARY}}

== Trades

{{TRADE_TABLE}}

== Open Positions

{{OPEN_POSITIONS}}
"#;

pub fn template() -> &'static str {
    TEMPLATE
}

/// Every placeholder the default template uses.
pub const PLACEHOLDERS: [&str; 8] = [
    "{{TITLE}}",
    "{{DESCRIPTION}}",
    "{{INPUTS_TABLE}}",
    "{{SUMMARY_TABLE}}",
    "{{EXIT_BREAKDOWN}}",
    "{{TICKER_SUMMARY}}",
    "{{TRADE_TABLE}}",
    "{{OPEN_POSITIONS}}",
];
