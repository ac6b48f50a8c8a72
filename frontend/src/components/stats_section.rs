use yew::prelude::*;

use crate::animation::visibility::{use_scroll_reveal, RevealOptions};
use crate::components::count_up::CountUp;

#[derive(Clone, PartialEq)]
pub struct StatItem {
    pub value: &'static str,
    pub label: &'static str,
}

pub const AGENCY_STATS: &[StatItem] = &[
    StatItem { value: "78%", label: "of leads contacted within 5 minutes" },
    StatItem { value: "3x", label: "more showings booked" },
    StatItem { value: "$2.5M", label: "in listings marketed every month" },
    StatItem { value: "5-7", label: "days to launch a campaign" },
    StatItem { value: "15+", label: "years in real estate marketing" },
    StatItem { value: "24/7", label: "lead follow-up" },
];

#[derive(Properties, PartialEq)]
pub struct RevealProps {
    #[prop_or_default]
    pub children: Children,
    #[prop_or_default]
    pub class: Classes,
}

/// Fades its children in the first time they scroll into view.
#[function_component(Reveal)]
pub fn reveal(props: &RevealProps) -> Html {
    let (node, revealed) = use_scroll_reveal(RevealOptions::default());
    html! {
        <div
            ref={node}
            class={classes!("reveal", props.class.clone(), revealed.then(|| "visible"))}
        >
            { for props.children.iter() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatsSectionProps {
    #[prop_or(AGENCY_STATS)]
    pub stats: &'static [StatItem],
}

#[function_component(StatsSection)]
pub fn stats_section(props: &StatsSectionProps) -> Html {
    html! {
        <section class="stats-section">
            <Reveal class="stats-grid">
                {
                    props.stats.iter().enumerate().map(|(i, stat)| {
                        html! {
                            <div class="stat-card" key={stat.label}>
                                <CountUp
                                    value={stat.value}
                                    delay_ms={(i as u32) * 150}
                                    class="stat-value"
                                />
                                <p class="stat-label">{stat.label}</p>
                            </div>
                        }
                    }).collect::<Html>()
                }
            </Reveal>
        </section>
    }
}
