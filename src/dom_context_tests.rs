#[cfg(test)]
mod tests {
    use crate::config::PickerConfig;
    use crate::dom_context::{computed_styles, extract_dom_context, selector_path};
    use crate::page::Page;
    use crate::static_page::StaticPage;

    fn page(html: &str) -> StaticPage {
        StaticPage::parse(html).unwrap()
    }

    #[test]
    fn test_selector_stops_at_id() {
        let page = page(
            r#"<body><div id="root"><main><p class="a">One</p><p class="a b">Two</p></main></div></body>"#,
        );
        let main = page.first_by_tag("main").unwrap();
        let paragraphs = page.child_elements(&main);

        assert_eq!(
            selector_path(&page, &paragraphs[0], 20),
            "div#root > main > p.a:nth-of-type(1)"
        );
        assert_eq!(
            selector_path(&page, &paragraphs[1], 20),
            "div#root > main > p.a.b:nth-of-type(2)"
        );
    }

    #[test]
    fn test_selector_without_ids_reaches_document_root() {
        let page = page(r#"<body><section class="  hero   wide "><span>t</span></section></body>"#);
        let span = page.first_by_tag("span").unwrap();
        assert_eq!(
            selector_path(&page, &span, 20),
            "html > body > section.hero.wide > span"
        );
    }

    #[test]
    fn test_selector_depth_cap_and_empty_id() {
        let page = page(r#"<body><section id=""><span>t</span></section></body>"#);
        let span = page.first_by_tag("span").unwrap();
        assert_eq!(selector_path(&page, &span, 2), "section > span");
        assert_eq!(selector_path(&page, &span, 1), "span");
    }

    #[test]
    fn test_nth_of_type_counts_same_tag_only() {
        let page = page(r#"<body><ul><li>a</li><span>s</span><li>b</li></ul></body>"#);
        let ul = page.first_by_tag("ul").unwrap();
        let children = page.child_elements(&ul);
        assert_eq!(
            selector_path(&page, &children[2], 2),
            "ul > li:nth-of-type(2)"
        );
        assert_eq!(selector_path(&page, &children[1], 2), "ul > span");
    }

    #[test]
    fn test_computed_styles_allow_list() {
        let mut page = page(r#"<body><div id="x" style="padding: 4px; cursor: pointer">x</div></body>"#);
        let x = page.get_element_by_id("x").unwrap();
        page.set_computed_style(&x, "display", "flex");
        page.set_computed_style(&x, "margin", "none");
        page.set_computed_style(&x, "color", "normal");
        page.set_computed_style(&x, "font-size", "  ");

        let styles = computed_styles(&page, &x);
        let keys: Vec<&str> = styles.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["display", "padding"]);
        assert_eq!(styles["padding"], "4px");
    }

    #[test]
    fn test_text_content_limits() {
        let config = PickerConfig::default();

        let blank = page("<body><div id=\"x\">   \n  </div></body>");
        let x = blank.get_element_by_id("x").unwrap();
        assert_eq!(extract_dom_context(&blank, Some(&x), &config).unwrap().text_content, None);

        let html = format!("<body><div id=\"x\"> {} </div></body>", "a".repeat(499));
        let short = page(&html);
        let x = short.get_element_by_id("x").unwrap();
        let text = extract_dom_context(&short, Some(&x), &config).unwrap().text_content;
        assert_eq!(text.map(|t| t.len()), Some(499));

        let html = format!("<body><div id=\"x\">{}</div></body>", "a".repeat(500));
        let long = page(&html);
        let x = long.get_element_by_id("x").unwrap();
        assert_eq!(extract_dom_context(&long, Some(&x), &config).unwrap().text_content, None);
    }

    #[test]
    fn test_missing_element_yields_nothing() {
        let page = page("<body></body>");
        assert!(extract_dom_context(&page, None, &PickerConfig::default()).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let page = page(r#"<body><a id="go" href="/next" class="btn">Go</a></body>"#);
        let a = page.get_element_by_id("go").unwrap();
        let context = extract_dom_context(&page, Some(&a), &PickerConfig::default()).unwrap();
        let value = serde_json::to_value(&context).unwrap();

        assert_eq!(value["outerHTML"], r#"<a id="go" href="/next" class="btn">Go</a>"#);
        assert_eq!(value["selector"], "a#go");
        assert_eq!(value["textContent"], "Go");
        let attribute_names: Vec<&String> = value["attributes"].as_object().unwrap().keys().collect();
        assert_eq!(attribute_names.len(), 3);
        assert!(value["computedStyles"].as_object().unwrap().is_empty());
    }
}
