mod cli_tests;
mod crawl_tests;
mod portal;
