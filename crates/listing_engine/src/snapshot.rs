use std::collections::{BTreeMap, HashMap};

use ego_tree::{NodeId, NodeRef};
use listing_core::resolve_href;
use listing_logging::listing_trace;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;
use url::Url;

use crate::{
    scripts, ContextHandle, ElementHandle, PageSource, Scope, ScriptArg, Surface, SurfaceError,
};

const PRIMARY: ContextHandle = ContextHandle(0);

struct Document {
    url: String,
    html: Html,
    /// Source length, reported as the document height.
    height: u64,
}

#[derive(Default)]
struct BrowsingContext {
    document: Option<Document>,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct ElementRecord {
    context: ContextHandle,
    generation: u64,
    node: NodeId,
}

/// A [`Surface`] over static HTML documents.
///
/// Pages come from a [`PageSource`] and never change after loading: no
/// scripts run and the document height is fixed. Clicking an element follows
/// the `href` of the element or its nearest enclosing anchor. Useful for
/// replaying saved listing pages.
pub struct SnapshotSurface<P> {
    source: P,
    contexts: BTreeMap<ContextHandle, BrowsingContext>,
    current: ContextHandle,
    next_context: u64,
    elements: HashMap<ElementHandle, ElementRecord>,
    /// Live handle per node, so repeated lookups hand out the same handle.
    handles: HashMap<(ContextHandle, u64, NodeId), ElementHandle>,
    next_element: u64,
    history: Vec<String>,
}

impl<P: PageSource> SnapshotSurface<P> {
    pub fn new(source: P) -> Self {
        let mut contexts = BTreeMap::new();
        contexts.insert(PRIMARY, BrowsingContext::default());
        Self {
            source,
            contexts,
            current: PRIMARY,
            next_context: PRIMARY.0 + 1,
            elements: HashMap::new(),
            handles: HashMap::new(),
            next_element: 0,
            history: Vec::new(),
        }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    /// Number of live contexts, the primary one included.
    pub fn open_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Every URL loaded so far, in any context, in load order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn load_into(&mut self, handle: ContextHandle, url: &str) -> Result<(), SurfaceError> {
        let page = self.source.load(url)?;
        let context = self
            .contexts
            .get_mut(&handle)
            .ok_or(SurfaceError::NoSuchContext(handle))?;
        listing_trace!("{:?} loaded {}", handle, page.url);
        context.document = Some(Document {
            height: page.html.len() as u64,
            html: Html::parse_document(&page.html),
            url: page.url.clone(),
        });
        context.generation += 1;
        self.forget_elements(handle);
        self.history.push(page.url);
        Ok(())
    }

    fn document(&self) -> Result<&Document, SurfaceError> {
        self.contexts
            .get(&self.current)
            .ok_or(SurfaceError::NoSuchContext(self.current))?
            .document
            .as_ref()
            .ok_or(SurfaceError::NoDocument)
    }

    fn element(&self, handle: ElementHandle) -> Result<(ElementRef<'_>, &Document), SurfaceError> {
        let stale = SurfaceError::StaleElement(handle);
        let record = self.elements.get(&handle).ok_or(stale.clone())?;
        if record.context != self.current {
            return Err(stale);
        }
        let context = self.contexts.get(&record.context).ok_or(stale.clone())?;
        let document = context
            .document
            .as_ref()
            .filter(|_| context.generation == record.generation)
            .ok_or(stale.clone())?;
        let element = document
            .html
            .tree
            .get(record.node)
            .and_then(ElementRef::wrap)
            .ok_or(stale)?;
        Ok((element, document))
    }

    fn forget_elements(&mut self, context: ContextHandle) {
        self.elements.retain(|_, record| record.context != context);
        self.handles.retain(|(owner, _, _), _| *owner != context);
    }

    fn register(&mut self, nodes: Vec<NodeId>) -> Vec<ElementHandle> {
        let context = self.current;
        let generation = self
            .contexts
            .get(&context)
            .map_or(0, |context| context.generation);
        nodes
            .into_iter()
            .map(|node| {
                if let Some(handle) = self.handles.get(&(context, generation, node)) {
                    return *handle;
                }
                let handle = ElementHandle(self.next_element);
                self.next_element += 1;
                self.elements.insert(
                    handle,
                    ElementRecord {
                        context,
                        generation,
                        node,
                    },
                );
                self.handles.insert((context, generation, node), handle);
                handle
            })
            .collect()
    }

    /// Navigates to the target of the element's own or enclosing link.
    fn follow(&mut self, handle: ElementHandle) -> Result<(), SurfaceError> {
        let target = {
            let (element, document) = self.element(handle)?;
            let disabled = element.value().attr("disabled").is_some()
                || element.value().attr("aria-disabled") == Some("true");
            let href = self_and_ancestors(element)
                .find(|candidate| candidate.value().name() == "a")
                .and_then(|anchor| anchor.value().attr("href"));
            let base = Url::parse(&document.url).ok();
            href.filter(|_| !disabled)
                .and_then(|href| resolve_href(href, base.as_ref()))
                .ok_or(SurfaceError::NotInteractable(handle))?
        };
        self.load_into(self.current, target.as_str())
    }
}

fn element_arg(args: &[ScriptArg]) -> Result<ElementHandle, SurfaceError> {
    match args.first() {
        Some(ScriptArg::Element(handle)) => Ok(*handle),
        _ => Err(SurfaceError::Script(
            "expected an element as arguments[0]".to_string(),
        )),
    }
}

fn parse_selector(selector: &str) -> Result<Selector, SurfaceError> {
    Selector::parse(selector).map_err(|err| SurfaceError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{err:?}"),
    })
}

fn self_and_ancestors(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    let node: NodeRef<'_, Node> = *element;
    std::iter::once(element).chain(node.ancestors().filter_map(ElementRef::wrap))
}

fn is_hidden(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some()
        || value.attr("aria-hidden") == Some("true")
        || (value.name() == "input" && value.attr("type") == Some("hidden"))
    {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}

impl<P: PageSource> Surface for SnapshotSurface<P> {
    fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.load_into(self.current, url)
    }

    fn find_all(
        &mut self,
        scope: Scope,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, SurfaceError> {
        let selector = parse_selector(selector)?;
        let nodes: Vec<NodeId> = match scope {
            Scope::Document => self
                .document()?
                .html
                .select(&selector)
                .map(|element| element.id())
                .collect(),
            Scope::Element(handle) => {
                let (element, _) = self.element(handle)?;
                element.select(&selector).map(|found| found.id()).collect()
            }
        };
        Ok(self.register(nodes))
    }

    fn text(&self, element: ElementHandle) -> Result<String, SurfaceError> {
        let (element, _) = self.element(element)?;
        let text = element.text().collect::<String>();
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SurfaceError> {
        let (element, _) = self.element(element)?;
        Ok(element.value().attr(name).map(str::to_string))
    }

    fn is_displayed(&self, element: ElementHandle) -> Result<bool, SurfaceError> {
        let (element, _) = self.element(element)?;
        let hidden = self_and_ancestors(element).any(|candidate| is_hidden(&candidate));
        Ok(!hidden)
    }

    fn click(&mut self, element: ElementHandle) -> Result<(), SurfaceError> {
        self.follow(element)
    }

    fn run_script(&mut self, script: &str, args: &[ScriptArg]) -> Result<Value, SurfaceError> {
        match script {
            scripts::SCROLL_TO_BOTTOM | scripts::NOOP => {
                self.document()?;
                Ok(Value::Null)
            }
            scripts::DOCUMENT_HEIGHT => Ok(Value::from(self.document()?.height)),
            scripts::SCROLL_INTO_VIEW => {
                self.element(element_arg(args)?)?;
                Ok(Value::Null)
            }
            scripts::FORCE_CLICK => {
                self.follow(element_arg(args)?)?;
                Ok(Value::Null)
            }
            other => Err(SurfaceError::Script(format!("unsupported script: {other}"))),
        }
    }

    fn open_context(&mut self, url: &str) -> Result<ContextHandle, SurfaceError> {
        let handle = ContextHandle(self.next_context);
        self.next_context += 1;
        self.contexts.insert(handle, BrowsingContext::default());
        if let Err(err) = self.load_into(handle, url) {
            self.contexts.remove(&handle);
            return Err(err);
        }
        Ok(handle)
    }

    fn close_context(&mut self, context: ContextHandle) -> Result<(), SurfaceError> {
        self.contexts
            .remove(&context)
            .ok_or(SurfaceError::NoSuchContext(context))?;
        self.forget_elements(context);
        Ok(())
    }

    fn focus(&mut self, context: ContextHandle) -> Result<(), SurfaceError> {
        if !self.contexts.contains_key(&context) {
            return Err(SurfaceError::NoSuchContext(context));
        }
        self.current = context;
        Ok(())
    }

    fn current_context(&self) -> ContextHandle {
        self.current
    }

    fn current_url(&self) -> Result<String, SurfaceError> {
        Ok(self.document()?.url.clone())
    }
}
