//! Reading and filling the case-status search form.

use scraper::{ElementRef, Html};
use url::Url;

use super::{ParseError, Selectors, attr_haystack, element_text};
use crate::constants::search::MIN_CAPTCHA_DIGITS;
use crate::domain::SearchQuery;

/// Longest digit run the fallback `<span>` scan accepts as a CAPTCHA.
const MAX_FALLBACK_CAPTCHA_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

/// What the page offers as human verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captcha {
    None,

    /// Digits printed in the markup, to be echoed into `field`.
    Numeric { value: String, field: String },

    /// An image challenge with no readable text.
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChoiceOption {
    value: String,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Select {
        name: String,
        options: Vec<ChoiceOption>,
    },
    Input {
        name: String,
    },
}

impl Field {
    fn name(&self) -> &str {
        match self {
            Self::Select { name, .. } | Self::Input { name } => name,
        }
    }

    /// Picks the submitted value for `wanted`, matching option text or value.
    fn resolve(&self, field: &'static str, wanted: &str) -> Result<String, ParseError> {
        match self {
            Self::Input { .. } => Ok(wanted.to_string()),
            Self::Select { options, .. } => options
                .iter()
                .find(|o| o.text.eq_ignore_ascii_case(wanted))
                .or_else(|| options.iter().find(|o| o.value.eq_ignore_ascii_case(wanted)))
                .map(|o| o.value.clone())
                .ok_or_else(|| ParseError::UnknownOption {
                    field,
                    value: wanted.to_string(),
                }),
        }
    }
}

/// The search form as found on the page, ready to be filled for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    action: Url,
    method: FormMethod,
    hidden: Vec<(String, String)>,
    case_type: Field,
    case_number: String,
    filing_year: Field,
    captcha: Captcha,
}

impl SearchForm {
    /// Parses the search form out of `html`, resolving its action against `page_url`.
    pub fn parse(html: &str, page_url: &Url) -> Result<Self, ParseError> {
        let selectors = Selectors::get()?;
        let document = Html::parse_document(html);

        let form = document
            .select(&selectors.form)
            .find(|form| form.select(&selectors.select).next().is_some())
            .or_else(|| document.select(&selectors.form).next())
            .ok_or(ParseError::MissingForm)?;

        let action = match form.value().attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => page_url
                .join(action)
                .map_err(|_| ParseError::InvalidAction(action.to_string()))?,
            _ => page_url.clone(),
        };

        let method = match form.value().attr("method") {
            Some(m) if m.eq_ignore_ascii_case("get") => FormMethod::Get,
            _ => FormMethod::Post,
        };

        let selects: Vec<ElementRef<'_>> = form.select(&selectors.select).collect();
        let inputs: Vec<ElementRef<'_>> = form.select(&selectors.input).collect();

        let case_type_el = selects
            .iter()
            .find(|s| attr_haystack(**s).contains("case_type"))
            .or_else(|| selects.first())
            .copied()
            .ok_or(ParseError::MissingField("case type"))?;
        let case_type = select_field(case_type_el, selectors)
            .ok_or(ParseError::MissingField("case type"))?;

        let text_inputs: Vec<ElementRef<'_>> = inputs
            .iter()
            .copied()
            .filter(|i| is_text_input(*i) && i.value().attr("name").is_some())
            .collect();

        let case_number_el = text_inputs
            .iter()
            .find(|i| attr_haystack(**i).contains("case_number"))
            .or_else(|| {
                text_inputs.iter().find(|i| {
                    i.value()
                        .attr("placeholder")
                        .is_some_and(|p| p.to_ascii_lowercase().contains("case"))
                })
            })
            .or_else(|| {
                text_inputs
                    .iter()
                    .find(|i| !attr_haystack(**i).contains("captcha"))
            })
            .copied()
            .ok_or(ParseError::MissingField("case number"))?;
        let case_number = field_name(case_number_el)
            .ok_or(ParseError::MissingField("case number"))?
            .to_string();

        let filing_year = selects
            .iter()
            .find(|s| attr_haystack(**s).contains("year"))
            .and_then(|s| select_field(*s, selectors))
            .or_else(|| {
                text_inputs
                    .iter()
                    .find(|i| attr_haystack(**i).contains("year"))
                    .and_then(|i| field_name(*i))
                    .map(|name| Field::Input {
                        name: name.to_string(),
                    })
            })
            .or_else(|| {
                selects
                    .last()
                    .filter(|s| s.id() != case_type_el.id())
                    .and_then(|s| select_field(*s, selectors))
            })
            .ok_or(ParseError::MissingField("filing year"))?;

        let captcha = match find_numeric_captcha(&document, selectors) {
            Some(value) => {
                let field = text_inputs
                    .iter()
                    .find(|i| {
                        attr_haystack(**i).contains("captcha")
                            || i.value()
                                .attr("placeholder")
                                .is_some_and(|p| p.to_ascii_lowercase().contains("captcha"))
                    })
                    .or_else(|| {
                        text_inputs
                            .iter()
                            .rev()
                            .find(|i| i.id() != case_number_el.id())
                    })
                    .and_then(|i| field_name(*i))
                    .ok_or(ParseError::MissingField("captcha"))?;
                Captcha::Numeric {
                    value,
                    field: field.to_string(),
                }
            }
            None if has_image_captcha(&document, selectors) => Captcha::Image,
            None => Captcha::None,
        };

        let mut hidden: Vec<(String, String)> = inputs
            .iter()
            .filter(|i| {
                i.value()
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
            })
            .filter_map(|i| {
                let name = field_name(*i)?;
                Some((
                    name.to_string(),
                    i.value().attr("value").unwrap_or_default().to_string(),
                ))
            })
            .collect();

        if let Some(submit) = inputs.iter().find(|i| {
            i.value()
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("submit"))
        }) && let Some(name) = field_name(*submit)
        {
            hidden.push((
                name.to_string(),
                submit.value().attr("value").unwrap_or_default().to_string(),
            ));
        }

        Ok(Self {
            action,
            method,
            hidden,
            case_type,
            case_number,
            filing_year,
            captcha,
        })
    }

    #[must_use]
    pub const fn action(&self) -> &Url {
        &self.action
    }

    #[must_use]
    pub const fn method(&self) -> FormMethod {
        self.method
    }

    #[must_use]
    pub const fn captcha(&self) -> &Captcha {
        &self.captcha
    }

    /// Form fields to submit for `query`, hidden fields first.
    pub fn fill(&self, query: &SearchQuery) -> Result<Vec<(String, String)>, ParseError> {
        let mut fields = self.hidden.clone();

        fields.push((
            self.case_type.name().to_string(),
            self.case_type.resolve("case type", query.case_type())?,
        ));
        fields.push((self.case_number.clone(), query.case_number().to_string()));
        fields.push((
            self.filing_year.name().to_string(),
            self.filing_year
                .resolve("filing year", &query.filing_year().to_string())?,
        ));

        if let Captcha::Numeric { value, field } = &self.captcha {
            fields.push((field.clone(), value.clone()));
        }

        Ok(fields)
    }
}

fn field_name(element: ElementRef<'_>) -> Option<&str> {
    element
        .value()
        .attr("name")
        .or_else(|| element.value().attr("id"))
        .filter(|n| !n.is_empty())
}

fn is_text_input(element: ElementRef<'_>) -> bool {
    element
        .value()
        .attr("type")
        .is_none_or(|t| matches!(t.to_ascii_lowercase().as_str(), "text" | "number" | "search" | "tel"))
}

fn select_field(element: ElementRef<'_>, selectors: &Selectors) -> Option<Field> {
    let name = field_name(element)?.to_string();
    let options = element
        .select(&selectors.option)
        .map(|option| {
            let text = element_text(option);
            let value = option
                .value()
                .attr("value")
                .map_or_else(|| text.clone(), str::to_string);
            ChoiceOption { value, text }
        })
        .collect();
    Some(Field::Select { name, options })
}

fn is_captcha_digits(text: &str, max_len: usize) -> bool {
    (MIN_CAPTCHA_DIGITS..=max_len).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric CAPTCHA text: first from elements tagged `captcha`, then from any short digit `<span>`.
fn find_numeric_captcha(document: &Html, selectors: &Selectors) -> Option<String> {
    let tagged = document
        .select(&selectors.any)
        .filter(|el| attr_haystack(*el).contains("captcha"))
        .filter(|el| !matches!(el.value().name(), "input" | "img" | "script" | "style"))
        .find_map(|el| {
            let own = element_text(el);
            if is_captcha_digits(&own, usize::MAX) {
                return Some(own);
            }
            el.select(&selectors.span)
                .map(element_text)
                .find(|text| is_captcha_digits(text, usize::MAX))
        });

    tagged.or_else(|| {
        document
            .select(&selectors.span)
            .map(element_text)
            .find(|text| is_captcha_digits(text, MAX_FALLBACK_CAPTCHA_DIGITS))
    })
}

fn has_image_captcha(document: &Html, selectors: &Selectors) -> bool {
    document.select(&selectors.img).any(|img| {
        let value = img.value();
        [value.attr("src"), value.attr("alt"), value.attr("id"), value.attr("class")]
            .into_iter()
            .flatten()
            .any(|attr| attr.to_ascii_lowercase().contains("captcha"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_PAGE: &str = r#"
        <html><body>
        <form action="/app/get-case-type-status" method="POST">
            <input type="hidden" name="_token" value="tok-123">
            <select id="case_type" name="case_type">
                <option value="">Select</option>
                <option value="CA">Civil Appeal</option>
                <option value="BAIL APPLN.">Bail Application</option>
            </select>
            <input type="text" id="case_number" name="case_number">
            <select id="case_year" name="case_year">
                <option value="2023">2023</option>
                <option value="2024">2024</option>
            </select>
            <div class="captcha-box"><span id="captcha-code"> 48213 </span></div>
            <input type="text" id="captchaInput" name="captcha">
            <button type="submit">Submit</button>
        </form>
        </body></html>
    "#;

    fn page_url() -> Url {
        Url::parse("https://court.example/app/get-case-type-status").unwrap()
    }

    fn query(case_type: &str, year: &str) -> SearchQuery {
        let types = vec!["Civil Appeal".to_string(), "Bail Application".to_string()];
        SearchQuery::parse(case_type, "1234", year, &types, 2025).unwrap()
    }

    #[test]
    fn test_parses_form_and_fills_fields() {
        let form = SearchForm::parse(FORM_PAGE, &page_url()).unwrap();
        assert_eq!(form.method(), FormMethod::Post);
        assert_eq!(
            form.action().as_str(),
            "https://court.example/app/get-case-type-status"
        );
        assert_eq!(
            form.captcha(),
            &Captcha::Numeric {
                value: "48213".to_string(),
                field: "captcha".to_string()
            }
        );

        let fields = form.fill(&query("Civil Appeal", "2023")).unwrap();
        assert_eq!(
            fields,
            vec![
                ("_token".to_string(), "tok-123".to_string()),
                ("case_type".to_string(), "CA".to_string()),
                ("case_number".to_string(), "1234".to_string()),
                ("case_year".to_string(), "2023".to_string()),
                ("captcha".to_string(), "48213".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejects_year_not_offered() {
        let form = SearchForm::parse(FORM_PAGE, &page_url()).unwrap();
        assert_eq!(
            form.fill(&query("Bail Application", "2020")),
            Err(ParseError::UnknownOption {
                field: "filing year",
                value: "2020".to_string()
            })
        );
    }

    #[test]
    fn test_falls_back_to_positional_fields() {
        let html = r#"
            <form action="search.php">
                <select name="a"><option>Civil Appeal</option></select>
                <input name="num">
                <select name="b"><option>2024</option></select>
            </form>
        "#;
        let form = SearchForm::parse(html, &page_url()).unwrap();
        assert_eq!(form.captcha(), &Captcha::None);
        assert_eq!(form.action().as_str(), "https://court.example/app/search.php");

        let fields = form.fill(&query("Civil Appeal", "2024")).unwrap();
        assert_eq!(
            fields,
            vec![
                ("a".to_string(), "Civil Appeal".to_string()),
                ("num".to_string(), "1234".to_string()),
                ("b".to_string(), "2024".to_string()),
            ]
        );
    }

    #[test]
    fn test_span_fallback_and_image_captcha() {
        let numeric = r#"
            <form><select name="case_type"><option>Civil Appeal</option></select>
            <input name="case_number"><select name="year"><option>2024</option></select>
            <input name="code"></form>
            <p>Enter <span>7310</span></p>
        "#;
        let form = SearchForm::parse(numeric, &page_url()).unwrap();
        assert_eq!(
            form.captcha(),
            &Captcha::Numeric {
                value: "7310".to_string(),
                field: "code".to_string()
            }
        );

        let image = r#"
            <form><select name="case_type"><option>Civil Appeal</option></select>
            <input name="case_number"><select name="year"><option>2024</option></select>
            <img src="/captcha/image.png"><input name="captcha"></form>
        "#;
        let form = SearchForm::parse(image, &page_url()).unwrap();
        assert_eq!(form.captcha(), &Captcha::Image);
    }

    #[test]
    fn test_missing_form() {
        assert_eq!(
            SearchForm::parse("<p>maintenance</p>", &page_url()),
            Err(ParseError::MissingForm)
        );
    }
}
