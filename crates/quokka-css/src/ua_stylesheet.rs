//! User-Agent Stylesheet
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! UA rules have the lowest priority in the cascade: any user or author rule
//! overrides a UA rule regardless of specificity.

use std::sync::OnceLock;

use crate::parser::Stylesheet;

/// [WHATWG HTML § 15.3](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
///
/// Default CSS rules for the elements the renderer lays out.
const UA_CSS: &str = r"
/* [§ 15.3.1 Hidden elements] */
area, base, datalist, head, link, meta, noscript, param, rp, script, style, template, title {
    display: none;
}

/* [§ 15.3.3 Flow content] */
address, article, aside, blockquote, body, center, dd, details, dialog, div, dl, dt,
fieldset, figcaption, figure, footer, form, h1, h2, h3, h4, h5, h6, header, hr, html,
legend, main, menu, nav, ol, p, pre, section, summary, ul {
    display: block;
}

/* [§ 15.3.2 The page] */
body {
    margin: 8px;
}

/* [§ 15.3.3] */
blockquote, figure {
    margin: 1em 40px;
}

p, dl, pre {
    margin: 1em 0;
}

dd {
    margin-left: 40px;
}

/* [§ 15.3.6 Sections and headings] */
h1 { font-size: 2em;    margin: 0.67em 0; }
h2 { font-size: 1.5em;  margin: 0.83em 0; }
h3 { font-size: 1.17em; margin: 1em 0; }
h4 { margin: 1.33em 0; }
h5 { font-size: 0.83em; margin: 1.67em 0; }
h6 { font-size: 0.67em; margin: 2.33em 0; }

/* [§ 15.3.7 Lists] */
ul, ol, menu {
    margin: 1em 0;
    padding-left: 40px;
}

li {
    display: list-item;
}

ul ul, ol ul, ul ol, ol ol {
    margin-top: 0;
    margin-bottom: 0;
}

/* [§ 15.3.11 The hr element] */
hr {
    margin: 0.5em 0;
    border: 1px inset gray;
}

/* [§ 15.3.4 Phrasing content] */
a[href] {
    color: #0000ee;
}

small {
    font-size: smaller;
}

big {
    font-size: larger;
}
";

/// Return the parsed UA stylesheet, parsing only once.
///
/// The stylesheet is parsed once and cached via `OnceLock`.
#[must_use]
pub fn ua_stylesheet() -> &'static Stylesheet {
    static STYLESHEET: OnceLock<Stylesheet> = OnceLock::new();
    STYLESHEET.get_or_init(|| {
        crate::parse_stylesheet(UA_CSS).unwrap_or_else(|err| {
            log::error!("user-agent stylesheet: {err}");
            Stylesheet::default()
        })
    })
}
