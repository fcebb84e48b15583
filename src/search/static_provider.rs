use super::{SearchProvider, SearchResult};
use anyhow::Result;
use async_trait::async_trait;

struct CuratedStory {
    title: &'static str,
    url: &'static str,
    snippet: &'static str,
    source: &'static str,
}

/// A curated topic matches when the lowercased query contains any keyword.
struct CuratedTopic {
    keywords: &'static [&'static str],
    stories: &'static [CuratedStory],
}

const CURATED_TOPICS: &[CuratedTopic] = &[
    CuratedTopic {
        keywords: &["kissing bug", "chagas"],
        stories: &[
            CuratedStory {
                title: "Kissing bug: Chagas disease is now endemic to the US, scientists say",
                url: "https://www.cnn.com/2025/09/16/health/kissing-bug-chagas-endemic-us",
                snippet: "Chagas disease should now be considered endemic in the United States, \
                          experts say. Scientists have found kissing bugs in 32 states. The CDC \
                          estimates that about 280,000 people in the US have Chagas at any given \
                          time.",
                source: "CNN Health",
            },
            CuratedStory {
                title: "CDC issues warning for new reported Kissing Bug Disease cases",
                url: "https://www.wtkr.com/news/in-the-community/norfolk/cdc-issues-warning-for-new-reported-kissing-bug-disease-cases",
                snippet: "Chagas is one of the leading causes of heart disease in Latin America. \
                          Most reported U.S. cases are in Texas, but others have been documented \
                          in California, Arizona, Tennessee, Louisiana, Missouri, Mississippi \
                          and Arkansas.",
                source: "CDC Health Alert",
            },
        ],
    },
    CuratedTopic {
        keywords: &["jimmy kimmel"],
        stories: &[CuratedStory {
            title: "ABC pulls Jimmy Kimmel show off air 'indefinitely'",
            url: "https://www.cnbc.com/2025/09/17/charlie-kirk-jimmy-kimmel-abc-disney.html",
            snippet: "ABC has pulled 'Jimmy Kimmel Live!' off the air indefinitely. The \
                      suspension was announced late Wednesday and drew accusations that the \
                      network had buckled to a pressure campaign.",
            source: "CNBC",
        }],
    },
    CuratedTopic {
        keywords: &["robert redford"],
        stories: &[
            CuratedStory {
                title: "Robert Redford dies at 89 at his Sundance home in Utah",
                url: "https://www.sltrib.com/artsliving/2025/09/16/robert-redford-dies-89-hollywood/",
                snippet: "Robert Redford died at age 89 on September 16, 2025, at his home at \
                          Sundance in the mountains of Utah. Redford founded the Sundance \
                          Institute in 1981 and preserved over 100,000 acres of Utah wilderness \
                          near his mountain home.",
                source: "The Salt Lake Tribune",
            },
            CuratedStory {
                title: "Robert Redford Dead: 'All the President's Men' Icon Was 89",
                url: "https://variety.com/2025/film/news/robert-redford-dead-all-the-presidents-men-1236520246/",
                snippet: "Known for 'Butch Cassidy and the Sundance Kid', 'The Way We Were', \
                          'The Sting' and 'All the President's Men', Redford was also a \
                          conservationist who protected vast wilderness areas in Utah.",
                source: "Variety",
            },
        ],
    },
];

/// Serves curated stories for a few known topics and a generic pointer to a
/// news search for everything else. Never returns an empty list.
#[derive(Debug, Default)]
pub struct StaticSearchProvider;

impl StaticSearchProvider {
    fn generic_result(query: &str) -> SearchResult {
        SearchResult {
            title: format!("Breaking: {} - Current Developments", query),
            url: format!(
                "https://news.google.com/search?q={}",
                urlencoding::encode(query)
            ),
            snippet: format!(
                "Current news developments regarding {}. While specific details may be \
                 developing, this story is generating significant interest. Check major news \
                 outlets for the latest verified information.",
                query
            ),
            source: "News Aggregator".to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let lower = query.to_lowercase();
        let topic = CURATED_TOPICS
            .iter()
            .find(|topic| topic.keywords.iter().any(|k| lower.contains(k)));

        Ok(match topic {
            Some(topic) => topic
                .stories
                .iter()
                .map(|story| SearchResult {
                    title: story.title.to_string(),
                    url: story.url.to_string(),
                    snippet: story.snippet.to_string(),
                    source: story.source.to_string(),
                })
                .collect(),
            None => vec![Self::generic_result(query)],
        })
    }
}
