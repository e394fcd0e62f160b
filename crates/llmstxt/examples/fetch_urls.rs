//! Example: read a few pages through a running reader proxy
//!
//! Start a proxy first (`llmstxt serve`), then run:
//! cargo run -p llmstxt --example fetch_urls
//!
//! Set LLMSTXT_PROXY to point at a proxy other than http://127.0.0.1:3000.

use llmstxt::{normalize_url, FetchResult, MarkdownClient, MarkdownSource};

/// Test case definition
struct TestCase {
    input: &'static str,
    description: &'static str,
    expect_contains: Option<&'static str>,
}

/// Define test cases here
const TEST_CASES: &[TestCase] = &[
    TestCase {
        input: "example.com",
        description: "Bare host",
        expect_contains: Some("Example Domain"),
    },
    TestCase {
        input: "www.example.com",
        description: "Leading www",
        expect_contains: Some("Example Domain"),
    },
    TestCase {
        input: "xyz.com/https://httpbin.org/html",
        description: "URL pasted behind another host",
        expect_contains: Some("Herman Melville"),
    },
];

#[tokio::main]
async fn main() {
    let proxy =
        std::env::var("LLMSTXT_PROXY").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let client = match MarkdownClient::new(&proxy) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("llmstxt URL Examples");
    println!("====================\n");

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in TEST_CASES.iter().enumerate() {
        let url = normalize_url(case.input);
        println!("{}. {}", i + 1, case.description);
        println!("   Input: {}", case.input);
        println!("   URL: {}", url);

        let result = client.fetch_markdown(&url).await;
        print_result_summary(&result);

        if check_expectations(case, &result) {
            println!("   ✓ PASS\n");
            passed += 1;
        } else {
            println!("   ✗ FAIL\n");
            failed += 1;
        }
    }

    println!("====================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_result_summary(result: &FetchResult) {
    match result {
        FetchResult::Data(markdown) => {
            let preview = markdown.chars().take(100).collect::<String>();
            let preview = preview.replace('\n', " ");
            println!("   Size: {} bytes", markdown.len());
            println!(
                "   Preview: {}{}",
                preview,
                if markdown.chars().count() > 100 { "..." } else { "" }
            );
        }
        FetchResult::Error(error) => println!("   Error: {}", error),
    }
}

fn check_expectations(case: &TestCase, result: &FetchResult) -> bool {
    let Some(markdown) = result.data() else {
        return false;
    };

    if let Some(expected_text) = case.expect_contains {
        if !markdown.contains(expected_text) {
            println!("   Expected content to contain '{}'", expected_text);
            return false;
        }
    }

    true
}
