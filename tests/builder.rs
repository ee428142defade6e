use urikit::{Builder, Error, Options, ParseErrorKind, SpaceEncoding};

const SEARCH_URL: &str = "https://www.tokopedia.com/search?condition=1&fcity=174,175,176,177,178,179&navsource=&rf=true&rt=4,5&srp_component_id=02.01.00.00&srp_page_id=&srp_page_title=&st=product&q=macbook air m2";

const PRODUCT_URL: &str = "https://www.tokopedia.com/acmic/acmic-usb-c-to-lightning-adapter-iphone-converter-connector-konektor?extParam=ivf%3Dfalse%26src%3Dsearch%26whid%3D13355454";

fn builder(url: &str, space: SpaceEncoding) -> Builder {
    Builder::with_options(Options::new(url).with_default_space_encoding(space)).unwrap()
}

#[test]
fn new_builder() {
    let b = Builder::new();
    assert_eq!(b.url_string(), "");
    assert!(b.uri().is_empty());
    assert_eq!(b.default_space_encoding(), SpaceEncoding::Plus);

    // Without the escape pass the query is kept as typed.
    let b = Builder::with_options(Options::new(SEARCH_URL)).unwrap();
    assert_eq!(b.url_string(), SEARCH_URL);

    let b = Builder::with_options(
        Options::new(SEARCH_URL)
            .with_escape_query(true)
            .with_default_space_encoding(SpaceEncoding::PercentTwenty),
    )
    .unwrap();
    assert_eq!(
        b.url_string(),
        "https://www.tokopedia.com/search?condition=1&fcity=174%2C175%2C176%2C177%2C178%2C179&navsource=&rf=true&rt=4%2C5&srp_component_id=02.01.00.00&srp_page_id=&srp_page_title=&st=product&q=macbook%20air%20m2"
    );

    let res = Builder::with_options(
        Options::new(SEARCH_URL.replacen("https", "http", 1))
            .with_escape_query(true)
            .with_restrict_scheme(["https"]),
    );
    assert_eq!(res.unwrap_err(), Error::InvalidScheme);
}

#[test]
fn escape_query_on_init() {
    let b = Builder::with_options(
        Options::new("https://www.tokopedia.com/search?navsource=&q=macbook air m2")
            .with_escape_query(true)
            .with_default_space_encoding(SpaceEncoding::PercentTwenty),
    )
    .unwrap();
    assert_eq!(b.raw_query(), "navsource=&q=macbook%20air%20m2");

    let b = Builder::with_options(
        Options::new("https://www.tokopedia.com/search?st=product&q=beras%20p%26g&srp_page_id=1012@dhome&srp_page_title=beras+putih&q=beras putih")
            .with_escape_query(true)
            .with_default_space_encoding(SpaceEncoding::Plus),
    )
    .unwrap();
    assert_eq!(
        b.uri().to_string(),
        "https://www.tokopedia.com/search?st=product&q=beras+p%26g&srp_page_id=1012%40dhome&srp_page_title=beras+putih&q=beras+putih"
    );
}

#[test]
fn escape_query_keeps_keys_and_malformed_values() {
    let b = builder(
        "https://example.com/?a%20b=1 2&c=100%&d",
        SpaceEncoding::Unencoded,
    );
    b.escape_query();
    assert_eq!(b.raw_query(), "a%20b=1 2&c=100%&d=");

    // Nothing to re-escape.
    let b = builder("https://example.com/?&&", SpaceEncoding::Plus);
    b.escape_query();
    assert_eq!(b.raw_query(), "&&");
}

#[test]
fn restrict_scheme() {
    let options = Options::new("http://example.com").with_restrict_scheme(["https"]);
    assert_eq!(
        Builder::with_options(options).unwrap_err(),
        Error::InvalidScheme
    );

    let options = Options::new("https://example.com").with_restrict_scheme([" HTTPS "]);
    assert!(Builder::with_options(options).is_ok());

    let options = Options::new("HTTPS://example.com").with_restrict_scheme(["https"]);
    assert!(Builder::with_options(options).is_ok());

    // An empty URL is not checked at construction, but is on assignment.
    let b = Builder::with_options(Options::default().with_restrict_scheme(["https"])).unwrap();
    assert_eq!(b.url_string(), "");
    assert_eq!(b.set_url("").unwrap_err(), Error::InvalidScheme);
    assert!(b.set_url("https://example.com").is_ok());
}

#[test]
fn parse_errors() {
    let err = Builder::with_options(Options::new("https://example.com/a%zz")).unwrap_err();
    match err {
        Error::Parse(e) => {
            assert_eq!(e.kind(), ParseErrorKind::InvalidOctet);
            assert_eq!(e.index(), 21);
        }
        e => panic!("unexpected error: {e}"),
    }

    let b = builder("https://example.com/", SpaceEncoding::Plus);
    assert!(matches!(b.set_url(":foo"), Err(Error::Parse(_))));
    assert_eq!(b.url_string(), "https://example.com/");
}

#[test]
fn add_query_param() {
    const URL: &str = "https://tokopedia.com/search";

    let b = builder(URL, SpaceEncoding::PercentTwenty);
    assert_eq!(b.add_query_param("", "").unwrap_err(), Error::KeyEmpty);
    assert_eq!(b.add_query_param("   ", "x").unwrap_err(), Error::KeyEmpty);
    assert_eq!(b.add_query_param("k ey", "").unwrap_err(), Error::KeyContainsSpace);
    assert_eq!(b.url_string(), URL);

    let b = builder(URL, SpaceEncoding::PercentTwenty);
    b.add_query_param(" key ", "value").unwrap();
    assert_eq!(b.url_string(), "https://tokopedia.com/search?key=value");

    let b = builder(URL, SpaceEncoding::PercentTwenty);
    b.add_query_param("key", "space value").unwrap();
    assert_eq!(b.url_string(), "https://tokopedia.com/search?key=space%20value");

    let b = builder(URL, SpaceEncoding::PercentTwenty);
    b.add_query_param_with("key", "space value", SpaceEncoding::PercentTwenty)
        .unwrap()
        .add_query_param_with("plus_key", "space value", SpaceEncoding::Plus)
        .unwrap();
    assert_eq!(
        b.url_string(),
        "https://tokopedia.com/search?key=space%20value&plus_key=space+value"
    );

    let b = builder(URL, SpaceEncoding::PercentTwenty);
    b.add_query_param_with("q", "produk p&g", SpaceEncoding::Plus)
        .unwrap()
        .add_query_param_with("navsource", "home campaign", SpaceEncoding::Unencoded)
        .unwrap()
        .add_query_param_with("srp_component_id", "02.01.00.00", SpaceEncoding::Plus)
        .unwrap();
    assert_eq!(
        b.url_string(),
        "https://tokopedia.com/search?q=produk+p%26g&navsource=home campaign&srp_component_id=02.01.00.00"
    );
}

#[test]
fn add_query_param_duplicate_and_delimiter_keys() {
    let b = builder("https://example.com/?a=1", SpaceEncoding::Plus);
    b.add_query_param("a", "2")
        .unwrap()
        .add_query_param("x&y", "3")
        .unwrap()
        .add_query_param("k=v", "4")
        .unwrap();
    assert_eq!(b.raw_query(), "a=1&a=2&x%26y=3&k%3Dv=4");
    assert_eq!(b.query_values()["a"], ["1", "2"]);
    assert_eq!(b.query_value("x&y").as_deref(), Some("3"));

    b.delete_query_key("x&y").delete_query_key("k=v");
    assert_eq!(b.raw_query(), "a=1&a=2");

    b.delete_query_key("a");
    assert_eq!(b.raw_query(), "");
    assert_eq!(b.url_string(), "https://example.com/");
}

#[test]
fn delete_query_key() {
    let b = builder(
        "https://www.tokopedia.com/search?st=product&q=produck%20p%26g&srp_component_id=01.07.00.00&srp_page_id=&srp_page_title=&navsource=&=exist_val_empty_key",
        SpaceEncoding::PercentTwenty,
    );
    for key in ["st", "srp_page_id", "navsource"] {
        b.delete_query_key(key);
    }
    assert_eq!(
        b.url_string(),
        "https://www.tokopedia.com/search?q=produck%20p%26g&srp_component_id=01.07.00.00&srp_page_title=&=exist_val_empty_key"
    );

    // An empty key removes nothing, not even an entry with an empty key.
    b.delete_query_key("");
    assert!(b.raw_query().ends_with("&=exist_val_empty_key"));

    let url = "https://www.tokopedia.com/search?st=product&q=produck%20p%26g&srp_component_id=01.07.00.00&srp_page_id=&srp_page_title=&navsource=";
    let b = builder(url, SpaceEncoding::PercentTwenty);
    b.delete_query_key("refer");
    assert_eq!(b.url_string(), url);

    let b = builder(
        "https://example.com/?st=product&q=beras%20p%26g&navsource=",
        SpaceEncoding::Plus,
    );
    b.delete_query_key("st").delete_query_key("navsource");
    assert_eq!(b.raw_query(), "q=beras%20p%26g");

    // A key that matches nothing leaves the query as found.
    let b = builder("https://example.com/?a=1&&b=2&", SpaceEncoding::Plus);
    b.delete_query_key("refer");
    assert_eq!(b.raw_query(), "a=1&&b=2&");
    assert_eq!(b.url_string(), "https://example.com/?a=1&&b=2&");

    // Keys are compared decoded.
    let b = builder("https://example.com/?my+key=1&my%20key=2&other=3", SpaceEncoding::Plus);
    b.delete_query_key("my key");
    assert_eq!(b.raw_query(), "other=3");
}

#[test]
fn fragment() {
    let b = builder("https://tokopedia.com/discovery#top", SpaceEncoding::PercentTwenty);
    b.delete_fragment();
    assert_eq!(b.url_string(), "https://tokopedia.com/discovery");
    b.delete_fragment();
    assert_eq!(b.fragment(), "");

    let b = builder("https://tokopedia.com/discovery", SpaceEncoding::PercentTwenty);
    b.set_fragment_with("top 10", SpaceEncoding::Plus);
    assert_eq!(b.url_string(), "https://tokopedia.com/discovery#top+10");
    assert_eq!(b.fragment(), "top+10");

    b.set_fragment("top 10");
    assert_eq!(b.fragment(), "top%2010");

    b.set_fragment_with("a+b c", SpaceEncoding::Unencoded);
    assert_eq!(b.url_string(), "https://tokopedia.com/discovery#a%2Bb c");

    b.delete_fragment();
    assert_eq!(b.url_string(), "https://tokopedia.com/discovery");
}

#[test]
fn set_path() {
    let b = builder(PRODUCT_URL, SpaceEncoding::PercentTwenty);
    b.set_path("/iphoneos/acmic-konektor");
    assert_eq!(
        b.url_string(),
        "https://www.tokopedia.com/iphoneos/acmic-konektor?extParam=ivf%3Dfalse%26src%3Dsearch%26whid%3D13355454"
    );
}

#[test]
fn set_base_url() {
    let b = Builder::with_options(
        Options::new(PRODUCT_URL)
            .with_default_space_encoding(SpaceEncoding::PercentTwenty)
            .with_restrict_scheme(["https", "tokopedia"]),
    )
    .unwrap();

    assert_eq!(b.set_base_url("ftp://files").unwrap_err(), Error::InvalidScheme);
    assert_eq!(b.url_string(), PRODUCT_URL);

    b.set_base_url("tokopedia://").unwrap();
    assert_eq!(
        b.url_string(),
        "tokopedia://acmic/acmic-usb-c-to-lightning-adapter-iphone-converter-connector-konektor?extParam=ivf%3Dfalse%26src%3Dsearch%26whid%3D13355454"
    );

    b.set_base_url("https://user@m.tokopedia.com:8443").unwrap();
    assert_eq!(b.scheme(), "https");
    assert_eq!(b.host().as_deref(), Some("m.tokopedia.com:8443"));
    assert_eq!(
        b.url_string(),
        "https://m.tokopedia.com:8443/acmic/acmic-usb-c-to-lightning-adapter-iphone-converter-connector-konektor?extParam=ivf%3Dfalse%26src%3Dsearch%26whid%3D13355454"
    );
}

#[test]
fn set_base_url_keeps_userinfo() {
    let b = builder("https://admin:pw@example.com/a?b=1", SpaceEncoding::Plus);
    b.set_base_url("http://guest@other.com").unwrap();
    assert_eq!(b.uri().userinfo(), Some("admin:pw"));
    assert_eq!(b.url_string(), "http://admin:pw@other.com/a?b=1");

    let b = builder("https://example.com/a", SpaceEncoding::Plus);
    b.set_base_url("https://user@other.com").unwrap();
    assert_eq!(b.uri().userinfo(), None);
    assert_eq!(b.url_string(), "https://other.com/a");
}

#[test]
fn set_path_without_authority() {
    let b = builder("mailto:someone", SpaceEncoding::Plus);
    b.set_path("//x/y");
    assert_eq!(b.host(), None);
    assert_eq!(b.url_string(), "mailto:/.//x/y");

    let reparsed = urikit::Uri::parse(&b.url_string()).unwrap();
    assert_eq!(reparsed.host(), None);
    assert_eq!(reparsed.to_string(), b.url_string());

    let b = builder("https://example.com/old", SpaceEncoding::Plus);
    b.set_path("//x");
    assert_eq!(b.url_string(), "https://example.com//x");
}

#[test]
fn set_url() {
    let b = Builder::with_options(
        Options::new(PRODUCT_URL)
            .with_default_space_encoding(SpaceEncoding::PercentTwenty)
            .with_restrict_scheme(["https", "tokopedia"])
            .with_escape_query(true),
    )
    .unwrap();

    b.set_url("tokopedia://webview?caption=gopaylater - cicil#bottom")
        .unwrap();
    assert_eq!(
        b.url_string(),
        "tokopedia://webview?caption=gopaylater%20-%20cicil#bottom"
    );

    assert_eq!(
        b.set_url("http://www.tokopedia.com/now").unwrap_err(),
        Error::InvalidScheme
    );
    assert_eq!(
        b.url_string(),
        "tokopedia://webview?caption=gopaylater%20-%20cicil#bottom"
    );
}

#[test]
fn url_string() {
    let url = "https://www.tokopedia.com/search?st=product&q=beras+putih&srp_component_id=01.07.00.00&srp_page_id=1012&srp_page_title=beras+putih&navsource=tokonow";
    let b = builder(url, SpaceEncoding::Plus);
    assert_eq!(b.url_string(), url);
    assert_eq!(b.to_string(), url);

    let b = builder(
        "https://www.tokopedia.com/search?st=product&q=beras%20p%26g&srp_component_id=01.07.00.00&srp_page_id=1012&srp_page_title=beras+putih&navsource=tokonow",
        SpaceEncoding::PercentTwenty,
    );
    assert_eq!(
        b.url_string_unescaped(),
        "https://www.tokopedia.com/search?st=product&q=beras p&g&srp_component_id=01.07.00.00&srp_page_id=1012&srp_page_title=beras putih&navsource=tokonow"
    );

    // Falls back to the escaped form.
    let b = builder("https://example.com/?q=100%", SpaceEncoding::Plus);
    assert_eq!(b.url_string_unescaped(), "https://example.com/?q=100%");
}

#[test]
fn query_values() {
    let b = builder(
        "https://www.tokopedia.com/search?st=product&q=beras%20p%26g&srp_component_id=01.07.00.00&srp_page_id=1012&srp_page_title=beras+putih&navsource=tokonow&q=beras%20putih&source=",
        SpaceEncoding::PercentTwenty,
    );
    assert_eq!(b.query_value("q").as_deref(), Some("beras p&g"));
    assert_eq!(b.query_value("ob"), None);

    let values = b.query_values();
    assert_eq!(values.len(), 7);
    assert_eq!(values["navsource"], ["tokonow"]);
    assert_eq!(values["q"], ["beras p&g", "beras putih"]);
    assert_eq!(values["srp_component_id"], ["01.07.00.00"]);
    assert_eq!(values["srp_page_id"], ["1012"]);
    assert_eq!(values["srp_page_title"], ["beras putih"]);
    assert_eq!(values["st"], ["product"]);
    assert_eq!(values["source"], [""]);
}

#[test]
fn paths() {
    let b = builder(
        "https://www.tokopedia.com/acmic/acmic-usb-c-to//lightning-adapter/iphone-converter/connector-konektor?extParam=ivf%3Dfalse%26src%3Dsearch%26whid%3D13355454",
        SpaceEncoding::PercentTwenty,
    );
    assert_eq!(
        b.paths(),
        [
            "acmic",
            "acmic-usb-c-to",
            "",
            "lightning-adapter",
            "iphone-converter",
            "connector-konektor"
        ]
    );
    assert_eq!(
        b.full_path(),
        "/acmic/acmic-usb-c-to//lightning-adapter/iphone-converter/connector-konektor"
    );

    assert!(Builder::new().paths().is_empty());
}

#[test]
fn shared_between_threads() {
    let b = builder("https://example.com/", SpaceEncoding::Plus);

    std::thread::scope(|s| {
        for i in 0..8 {
            let b = &b;
            s.spawn(move || {
                b.add_query_param("n", &i.to_string()).unwrap();
                let _ = b.url_string();
            });
        }
    });

    let mut values = b.query_values().remove("n").unwrap();
    values.sort();
    assert_eq!(values, ["0", "1", "2", "3", "4", "5", "6", "7"]);
}
