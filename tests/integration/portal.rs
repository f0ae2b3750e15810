//! Synthetic portal served through `FixtureSession`

use std::sync::Arc;
use tm_harvest::browser::FixtureSession;
use tm_harvest::config::Config;
use tm_harvest::crawler::enabled_next_selector;

pub const SEARCH_URL: &str = "https://portal.test/advanced-search";

pub const FORM: &str = r#"
<html><body>
  <form id="searchForm">
    <div class="ui-chkbox-box"><input type="checkbox" id="ipType_trademark"></div>
    <div class="ui-chkbox-box"><input type="checkbox" id="ipType_patent" checked></div>
    <div class="ui-chkbox-box"><input type="checkbox" id="status_registered"></div>
    <div class="ui-chkbox-box"><input type="checkbox" id="status_filed"></div>
    <div id="dateRange">
      <input id="dateFrom_input" value="">
      <input id="dateTo_input" value="">
    </div>
    <button id="searchButton" type="submit">Search</button>
  </form>
</body></html>
"#;

pub fn results_url(page: usize) -> String {
    format!("https://portal.test/results?page={}", page)
}

pub fn detail_url(id: &str) -> String {
    format!("https://portal.test/detail/{}", id)
}

pub fn config() -> Config {
    let mut config = Config::default();
    config.portal.search_url = SEARCH_URL.to_string();
    config
}

/// A results page listing `ids`, with an enabled or disabled "next" control
pub fn results_page(ids: &[&str], has_next: bool) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<tr><td><a href="/detail/{id}">{id}</a></td><td>Trademark</td></tr>"#,
                id = id
            )
        })
        .collect();
    let next = if has_next {
        r##"<a class="ui-paginator-next" href="#">Next</a>"##
    } else {
        r##"<a class="ui-paginator-next ui-state-disabled" href="#">Next</a>"##
    };

    format!(
        r#"<html><body>
            <table id="resultsTable"><tbody>{rows}</tbody></table>
            <div class="ui-paginator">{next}</div>
        </body></html>"#,
        rows = rows,
        next = next
    )
}

pub fn detail_page(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<tr><td class="label">{}</td><td class="value">{}</td></tr>"#,
                label, value
            )
        })
        .collect();

    format!(
        r#"<html><body><div id="detailPanel"><table><tbody>{}</tbody></table></div></body></html>"#,
        rows
    )
}

pub fn message_page(text: &str) -> String {
    format!(
        r#"<html><body><div class="ui-messages-info"><span class="ui-messages-info-summary">{}</span></div></body></html>"#,
        text
    )
}

/// Search form whose submit button leads to `results`
pub fn portal_with_results(config: &Config, results: &str) -> Arc<FixtureSession> {
    let session = Arc::new(FixtureSession::new());
    session.add_page(SEARCH_URL, FORM);
    session.add_page(&results_url(1), results);
    session.on_click(SEARCH_URL, &config.portal.submit_button, &results_url(1));
    session
}

/// Two result pages with two rows each, every detail page valid
pub fn two_page_portal(config: &Config) -> Arc<FixtureSession> {
    let session = portal_with_results(config, &results_page(&["1", "2"], true));
    let next = enabled_next_selector(&config.portal);

    session.add_page(&results_url(2), &results_page(&["3", "4"], false));
    session.on_click(&results_url(1), &next, &results_url(2));

    for id in ["1", "2", "3", "4"] {
        let title = format!("MARK {}", id);
        let number = format!("Z-{}", id);
        session.add_page(
            &detail_url(id),
            &detail_page(&[
                ("Name/Title", &format!("<span class=\"highlight\">{}</span> (word)", title)),
                ("Status", "Registered"),
                ("Application number", &number),
                ("Application date", "2024-01-10"),
                ("Trademark type", ""),
            ]),
        );
    }

    session
}
