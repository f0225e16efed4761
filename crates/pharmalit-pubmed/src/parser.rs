//! efetch XML parser using quick-xml
//!
//! Streaming parser for the `PubmedArticleSet` documents returned by
//! `efetch.fcgi?db=pubmed&retmode=xml`. Only the fields the extractor
//! needs are kept.

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One `<PubmedArticle>` as delivered by efetch
#[derive(Debug, Default, Clone)]
pub struct PubmedArticle {
    /// Empty when the document carried no `<PMID>`
    pub pmid: String,
    pub title: Option<String>,

    // Journal issue publication date
    pub pub_year: Option<i32>,
    pub pub_month: Option<u32>,
    pub pub_day: Option<u32>,

    pub authors: Vec<Author>,
}

#[derive(Debug, Default, Clone)]
pub struct Author {
    pub last_name: Option<String>,
    pub fore_name: Option<String>,
    pub collective_name: Option<String>,
    /// One entry per `<AffiliationInfo>`, document order
    pub affiliations: Vec<String>,
}

/// Parse every `<PubmedArticle>` in an efetch response.
///
/// Articles that fail to parse individually are logged and skipped; a
/// document-level XML error or a missing `<PubmedArticleSet>` root fails
/// the whole call.
pub fn parse_pubmed_xml(xml: &str) -> Result<Vec<PubmedArticle>> {
    // Text is not trimmed per event: inline markup would lose its spacing
    let mut reader = Reader::from_str(xml);

    let mut articles = Vec::new();
    let mut saw_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"PubmedArticleSet" => saw_root = true,
            Ok(Event::Empty(e)) if e.name().as_ref() == b"PubmedArticleSet" => saw_root = true,
            Ok(Event::Start(e)) if e.name().as_ref() == b"PubmedArticle" => {
                match parse_article(&mut reader) {
                    Ok(article) => articles.push(article),
                    Err(e) => log::warn!("Failed to parse article: {e}"),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    anyhow::ensure!(saw_root, "no <PubmedArticleSet> element in response");
    Ok(articles)
}

fn parse_article(reader: &mut Reader<&[u8]>) -> Result<PubmedArticle> {
    let mut article = PubmedArticle::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"MedlineCitation" => {
                parse_medline_citation(reader, &mut article)?
            }
            Event::End(e) if e.name().as_ref() == b"PubmedArticle" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(article)
}

fn parse_medline_citation(reader: &mut Reader<&[u8]>, article: &mut PubmedArticle) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                // CommentsCorrections also carry <PMID>; the first one is the article's own
                b"PMID" => {
                    let pmid = read_text(reader)?;
                    if article.pmid.is_empty() {
                        article.pmid = pmid.trim().to_string();
                    }
                }
                b"Article" => parse_article_element(reader, article)?,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"MedlineCitation" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_article_element(reader: &mut Reader<&[u8]>, article: &mut PubmedArticle) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Journal" => parse_journal(reader, article)?,
                b"ArticleTitle" => {
                    article.title = Some(read_text_content(reader, b"ArticleTitle")?)
                }
                b"AuthorList" => article.authors = parse_author_list(reader)?,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Article" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_journal(reader: &mut Reader<&[u8]>, article: &mut PubmedArticle) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"PubDate" => parse_pub_date(reader, article)?,
            Event::End(e) if e.name().as_ref() == b"Journal" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn parse_pub_date(reader: &mut Reader<&[u8]>, article: &mut PubmedArticle) -> Result<()> {
    let mut buf = Vec::new();
    let mut medline_date = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"Year" => article.pub_year = read_text(reader)?.trim().parse().ok(),
                b"Month" => article.pub_month = parse_month(read_text(reader)?.trim()),
                b"Day" => article.pub_day = read_text(reader)?.trim().parse().ok(),
                b"MedlineDate" => medline_date = Some(read_text(reader)?),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"PubDate" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Free-form dates like "2023 Jan-Feb" or "1998 Dec-1999 Jan"
    if article.pub_year.is_none() {
        if let Some(text) = medline_date {
            let (year, month) = parse_medline_date(&text);
            article.pub_year = year;
            article.pub_month = article.pub_month.or(month);
        }
    }

    Ok(())
}

/// Month as 1-12 from either a number or an English month name/abbreviation.
pub fn parse_month(s: &str) -> Option<u32> {
    let month = match s.parse::<u32>() {
        Ok(n) => n,
        Err(_) => {
            let prefix: String = s.chars().take(3).collect::<String>().to_lowercase();
            match prefix.as_str() {
                "jan" => 1,
                "feb" => 2,
                "mar" => 3,
                "apr" => 4,
                "may" => 5,
                "jun" => 6,
                "jul" => 7,
                "aug" => 8,
                "sep" => 9,
                "oct" => 10,
                "nov" => 11,
                "dec" => 12,
                _ => return None,
            }
        }
    };
    (1..=12).contains(&month).then_some(month)
}

/// Leading year and first month name of a `<MedlineDate>`.
fn parse_medline_date(text: &str) -> (Option<i32>, Option<u32>) {
    let mut tokens = text.split(|c: char| c.is_whitespace() || c == '-');
    let year = tokens
        .next()
        .filter(|t| t.len() == 4)
        .and_then(|t| t.parse().ok());
    let month = year.and(tokens.find_map(|t| {
        // Seasons ("Spring") and stray numbers are not months
        t.chars().all(|c| c.is_ascii_alphabetic()).then(|| parse_month(t)).flatten()
    }));
    (year, month)
}

fn parse_author_list(reader: &mut Reader<&[u8]>) -> Result<Vec<Author>> {
    let mut authors = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Author" => {
                authors.push(parse_author(reader)?);
            }
            Event::End(e) if e.name().as_ref() == b"AuthorList" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(authors)
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<Author> {
    let mut author = Author::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"LastName" => author.last_name = Some(read_text(reader)?),
                b"ForeName" => author.fore_name = Some(read_text(reader)?),
                b"CollectiveName" => {
                    author.collective_name = Some(read_text_content(reader, b"CollectiveName")?)
                }
                b"AffiliationInfo" => {
                    if let Some(aff) = parse_affiliation(reader)? {
                        author.affiliations.push(aff);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"Author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(author)
}

fn parse_affiliation(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let mut affiliation = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().as_ref() == b"Affiliation" => {
                let text = read_text_content(reader, b"Affiliation")?;
                let text = text.trim();
                if !text.is_empty() {
                    affiliation = Some(text.to_string());
                }
            }
            Event::End(e) if e.name().as_ref() == b"AffiliationInfo" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(affiliation)
}

/// Read text content until next end tag, whitespace-normalized
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    read_raw_text(reader, &mut text)?;
    Ok(normalize_whitespace(&text))
}

fn read_raw_text(reader: &mut Reader<&[u8]>, text: &mut String) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::End(_) => break,
            // Nested elements (like <i>, <b>, etc.)
            Event::Start(_) => read_raw_text(reader, text)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Trim and collapse runs of whitespace (including newlines) to one space
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read text content of a specific element, handling nested markup
fn read_text_content(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(normalize_whitespace(&text))
}
