// fontchain/atlas/src/manager.rs
//
// Copyright © 2026 The Fontchain Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The font atlas: font caches, texture pages, and their lifecycle.
//!
//! One reader/writer lock guards all mutable state. Resolving a font takes an upgradable read,
//! and only upgrades to insert a pending task on a miss; the task itself runs on the executor
//! with no lock held, so every key has at most one construction in flight. Fonts lock
//! themselves before they lock the atlas, never the other way around.

use crate::adapters::baked::baked_glyph_record;
use crate::adapters::{BakedFont, PlaceholderFont, RasterizedFont, RescaledFont};
use crate::chain::{FontChain, UnicodeRange};
use crate::composer::ChainFont;
use crate::engine::{AtlasServices, FaceSource, FontFace};
use crate::error::{AtlasError, AtlasResult};
use crate::font::{FontMetrics, NativeFontHandle, PhysicalFont};
use crate::gamma::GammaTable;
use crate::glyph::GlyphBitmap;
use crate::ident::{self, BakedSize, BundledFont, FontIdentifier, GameFontFamily};
use crate::marks::SharedMarks;
use crate::native::NativeFont;
use crate::options::{self, AtlasOptions, MissingFontPolicy};
use crate::page::{self, PageSet, Placement, TexturePage};
use crate::task::{FontHandle, FontJob, FontTask, Lease, TaskSlot};
use euclid::{Point2D, Rect, Size2D};
use fontchain_otf::FontFile;
use fontchain_otf::kerning::{self, CodepointKerning};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock, RwLockUpgradableReadGuard};
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// The channel slot of page 0 that holds the host toolkit's glyphs and the shared marks.
pub const DEFAULT_CONTENT_SLOT: u16 = 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AtlasState {
    /// No pages exist. The next font request builds the atlas.
    Empty,
    Built,
    /// Torn down for good.
    Disposed,
}

type FontKey = (FontIdentifier, u32);
type ChainKey = (FontChain, u32);

/// Loaded fonts by native handle, with the user count of their cache entries.
type HandleIndex = FxHashMap<NativeFontHandle, (Arc<dyn PhysicalFont>, Arc<AtomicUsize>)>;

struct CacheEntry {
    slot: Arc<TaskSlot>,
    users: Arc<AtomicUsize>,
    size_px: f32,
}

impl CacheEntry {
    #[inline]
    fn task(&self) -> FontTask {
        FontTask::new(self.slot.clone(), Lease::new(&self.users), self.size_px)
    }

    /// True if the font finished loading and nobody holds it.
    fn is_unused(&self) -> bool {
        self.users.load(Ordering::Acquire) == 0 &&
            self.slot.try_get().map(|result| result.is_ok()).unwrap_or(false)
    }
}

/// A game texture file, kept so it can be attached again after a rebuild.
struct GameTexture {
    file_index: u32,
    size: Size2D<u32>,
    pixels: Vec<u8>,
    page: usize,
}

struct AtlasData {
    lifecycle: AtlasState,
    pages: PageSet,
    gamma: GammaTable,
    requested_gamma: f32,
    fonts: FxHashMap<FontKey, CacheEntry>,
    chains: FxHashMap<ChainKey, CacheEntry>,
    by_handle: HandleIndex,
    memory_fonts: FxHashMap<String, Arc<[u8]>>,
    fallback_chain: Option<FontChain>,
    default_font: Option<Arc<dyn PhysicalFont>>,
    marks: Option<SharedMarks>,
    game_textures: Vec<GameTexture>,
    /// Bumped whenever the font caches are dropped. Jobs queued before then do not index
    /// their fonts.
    generation: u64,
}

impl AtlasData {
    fn drop_fonts(&mut self) {
        self.fonts.clear();
        self.chains.clear();
        self.by_handle.clear();
        self.default_font = None;
        self.generation += 1;
    }

    /// Back to `Empty`. Game textures are remembered for the next build.
    fn reset(&mut self) {
        self.drop_fonts();
        self.pages.clear();
        self.marks = None;
        self.gamma = GammaTable::new(self.requested_gamma);
        self.lifecycle = AtlasState::Empty;
    }
}

struct AtlasShared {
    options: AtlasOptions,
    services: AtlasServices,
    state: RwLock<AtlasData>,
    /// Kerning depends only on font data, so it outlives rebuilds.
    kerning: Mutex<FxHashMap<FontIdentifier, Option<Arc<CodepointKerning>>>>,
    suppress_count: AtomicUsize,
    font_stack: Mutex<Vec<FontHandle>>,
}

/// A cheaply cloneable reference to one atlas.
#[derive(Clone)]
pub struct FontAtlas {
    shared: Arc<AtlasShared>,
}

impl FontAtlas {
    pub fn new(options: AtlasOptions, services: AtlasServices) -> AtlasResult<FontAtlas> {
        options.validate()?;
        let data = AtlasData {
            lifecycle: AtlasState::Empty,
            pages: PageSet::new(&options),
            gamma: GammaTable::new(options.gamma),
            requested_gamma: options.gamma,
            fonts: FxHashMap::default(),
            chains: FxHashMap::default(),
            by_handle: FxHashMap::default(),
            memory_fonts: FxHashMap::default(),
            fallback_chain: None,
            default_font: None,
            marks: None,
            game_textures: vec![],
            generation: 0,
        };
        Ok(FontAtlas {
            shared: Arc::new(AtlasShared {
                options,
                services,
                state: RwLock::new(data),
                kerning: Mutex::new(FxHashMap::default()),
                suppress_count: AtomicUsize::new(0),
                font_stack: Mutex::new(vec![]),
            }),
        })
    }

    #[inline]
    pub fn options(&self) -> &AtlasOptions {
        &self.shared.options
    }

    #[inline]
    pub fn state(&self) -> AtlasState {
        self.shared.state.read().lifecycle
    }

    /// Builds the atlas now instead of on the first font request.
    pub fn build(&self) -> AtlasResult<()> {
        self.prepare()
    }

    /// Resolves a physical font. Requests whose sizes round to the same pixel share one font.
    ///
    /// Bad arguments fail here and are not remembered. Everything else, construction failures
    /// included, is reported through the returned task and cached.
    pub fn get_font(&self, identifier: &FontIdentifier, size_px: f32) -> AtlasResult<FontTask> {
        if identifier.is_empty() {
            return Err(AtlasError::invalid("no font identifier given"))
        }
        check_size(size_px)?;
        self.prepare()?;

        let key_size = ident::size_key(size_px);
        let key = (identifier.clone(), key_size);
        let state = self.shared.state.upgradable_read();
        if state.lifecycle == AtlasState::Disposed {
            return Err(AtlasError::Disposed)
        }
        if let Some(entry) = state.fonts.get(&key) {
            return Ok(entry.task())
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        let size_px = key_size as f32;
        let users = Arc::new(AtomicUsize::new(0));
        let job = self.font_job(identifier.clone(), size_px, users.clone(), state.generation);
        let entry = CacheEntry { slot: TaskSlot::queued(job), users, size_px };
        let task = entry.task();
        let slot = entry.slot.clone();
        state.fonts.insert(key, entry);
        drop(state);

        debug!("queued {} at {}px", identifier, size_px);
        self.shared.services.executor.spawn(Box::new(move || slot.run()));
        Ok(task)
    }

    /// Resolves a chain with every size and offset multiplied by `scale`.
    pub fn get_font_chain(&self, chain: &FontChain, scale: f32) -> AtlasResult<FontTask> {
        chain.validate()?;
        check_size(scale)?;
        self.prepare()?;

        let key = (chain.clone(), scale.to_bits());
        let state = self.shared.state.upgradable_read();
        if state.lifecycle == AtlasState::Disposed {
            return Err(AtlasError::Disposed)
        }
        if let Some(entry) = state.chains.get(&key) {
            return Ok(entry.task())
        }

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        let users = Arc::new(AtomicUsize::new(0));
        let job = self.chain_job(chain.scaled(scale), users.clone(), state.generation);
        let size_px = chain.primary.size_px * scale;
        let entry = CacheEntry { slot: TaskSlot::queued(job), users, size_px };
        let task = entry.task();
        let slot = entry.slot.clone();
        state.chains.insert(key, entry);
        drop(state);

        debug!("queued chain of {} at scale {}", chain.primary.identifier, scale);
        self.shared.services.executor.spawn(Box::new(move || slot.run()));
        Ok(task)
    }

    /// Returns the font if the task has finished, and otherwise what `policy` says to use while
    /// it loads or after it failed. Never blocks on the task.
    pub fn resolve(&self, task: &FontTask, policy: MissingFontPolicy) -> Option<FontHandle> {
        match task.try_get() {
            Some(Ok(font)) => return Some(font),
            Some(Err(error)) => debug!("resolving a failed font by {:?}: {}", policy, error),
            None => {}
        }
        match policy {
            MissingFontPolicy::Skip => None,
            MissingFontPolicy::Fallback => self.fallback_font(),
            MissingFontPolicy::Placeholder => Some(self.placeholder_font(task.size_px())),
        }
    }

    /// Loads glyphs on `font`, or on the current font if `font` is `None`.
    pub fn load_glyphs(&self, font: Option<&FontHandle>, codepoints: &[u32]) -> AtlasResult<()> {
        let font = match font {
            Some(font) => font.clone(),
            None => self.current_font()?,
        };
        font.load_glyphs(self, codepoints)
    }

    pub fn load_text(&self, font: Option<&FontHandle>, text: &str) -> AtlasResult<()> {
        let codepoints: Vec<u32> = text.chars().map(|character| character as u32).collect();
        self.load_glyphs(font, &codepoints)
    }

    pub fn load_glyph_ranges(&self, font: Option<&FontHandle>, ranges: &[UnicodeRange])
                             -> AtlasResult<()> {
        let font = match font {
            Some(font) => font.clone(),
            None => self.current_font()?,
        };
        font.load_ranges(self, ranges)
    }

    /// Loads glyphs on a font known only by its native handle.
    pub fn load_glyphs_for_handle(&self, handle: NativeFontHandle, codepoints: &[u32])
                                  -> AtlasResult<()> {
        match self.font_by_handle(handle) {
            Some(font) => font.load_glyphs(self, codepoints),
            None => Err(AtlasError::not_found(format!("no font with handle {}", handle.0))),
        }
    }

    /// Makes `font` the current font until the returned guard is dropped.
    pub fn push_font_scoped(&self, font: FontHandle) -> FontScope<'_> {
        let mut stack = self.shared.font_stack.lock();
        stack.push(font);
        FontScope { atlas: self, depth: stack.len() - 1 }
    }

    /// The innermost pushed font, or the host toolkit's default font.
    pub fn current_font(&self) -> AtlasResult<FontHandle> {
        if let Some(font) = self.shared.font_stack.lock().last() {
            return Ok(font.clone())
        }
        self.default_font()
    }

    /// The host toolkit's built-in glyphs.
    pub fn default_font(&self) -> AtlasResult<FontHandle> {
        self.prepare()?;
        let state = self.shared.state.read();
        match state.default_font {
            Some(ref font) => Ok(FontHandle::detached(font.clone())),
            None => Err(AtlasError::Disposed),
        }
    }

    /// Holds back texture uploads until every guard is dropped; the last one uploads.
    pub fn suppress_texture_updates(&self) -> SuppressTextureUpdates<'_> {
        self.shared.suppress_count.fetch_add(1, Ordering::AcqRel);
        SuppressTextureUpdates { atlas: self }
    }

    /// Uploads every dirty page and returns how many there were. Does nothing while updates are
    /// suppressed.
    pub fn update_textures(&self) -> usize {
        if self.shared.suppress_count.load(Ordering::Acquire) > 0 {
            return 0
        }
        let mut state = self.shared.state.write();
        let uploader = &self.shared.services.uploader;
        let mut uploaded = 0;
        for (index, page) in state.pages.iter_mut().enumerate() {
            if page.is_dirty() {
                uploader.upload(index, page.size(), page.pixels());
                page.clear_dirty();
                uploaded += 1;
            }
        }
        if uploaded > 0 {
            debug!("uploaded {} texture page(s)", uploaded);
        }
        uploaded
    }

    /// Drops every font and page. The atlas is built again on the next font request; handles
    /// obtained before the clear keep working but point at discarded pages.
    pub fn clear(&self) {
        {
            let mut state = self.shared.state.write();
            if state.lifecycle == AtlasState::Disposed {
                return
            }
            state.reset();
        }
        self.shared.font_stack.lock().clear();
        info!("cleared font atlas");
    }

    /// Forgets failed loads so that they are attempted again.
    pub fn clear_load_error_history(&self) {
        let mut state = self.shared.state.write();
        let before = state.fonts.len() + state.chains.len();
        state.fonts.retain(|_, entry| !entry.slot.is_failed());
        state.chains.retain(|_, entry| !entry.slot.is_failed());
        let forgotten = before - state.fonts.len() - state.chains.len();
        if forgotten > 0 {
            debug!("forgot {} failed font load(s)", forgotten);
        }
    }

    /// The cached failure for a font, if its load failed.
    pub fn get_load_exception(&self, identifier: &FontIdentifier, size_px: f32)
                              -> Option<AtlasError> {
        let key = (identifier.clone(), ident::size_key(size_px));
        self.shared.state.read().fonts.get(&key).and_then(|entry| entry.slot.error())
    }

    pub fn get_chain_load_exception(&self, chain: &FontChain, scale: f32) -> Option<AtlasError> {
        let key = (chain.clone(), scale.to_bits());
        self.shared.state.read().chains.get(&key).and_then(|entry| entry.slot.error())
    }

    /// Sets the gamma for glyphs rasterized from now on. The change is noticed by the next font
    /// request, which rebuilds the atlas if `rebuild_on_gamma_change` is set.
    pub fn set_gamma(&self, gamma: f32) -> AtlasResult<()> {
        options::check_gamma(gamma)?;
        self.shared.state.write().requested_gamma = gamma;
        Ok(())
    }

    /// The gamma glyphs are currently rasterized with.
    pub fn gamma(&self) -> f32 {
        self.shared.state.read().gamma.gamma()
    }

    /// Sets the chain that supplies glyphs missing from every other font.
    pub fn set_fallback_chain(&self, chain: Option<FontChain>) -> AtlasResult<()> {
        if let Some(ref chain) = chain {
            chain.validate()?;
            info!("fallback chain is now led by {}", chain.primary.identifier);
        }
        self.shared.state.write().fallback_chain = chain;
        Ok(())
    }

    /// The fallback chain's font, if one is configured and loads.
    pub fn fallback_font(&self) -> Option<FontHandle> {
        let chain = self.shared.state.read().fallback_chain.clone()?;
        match self.get_font_chain(&chain, 1.0).and_then(|task| task.wait()) {
            Ok(font) => Some(font),
            Err(error) => {
                warn!("fallback chain is unavailable: {}", error);
                None
            }
        }
    }

    /// Makes sfnt data available as `FontIdentifier::NamedMemory` and to `SystemFamily` requests
    /// for its family.
    pub fn register_memory_font(&self, name: &str, bytes: Arc<[u8]>) -> AtlasResult<()> {
        {
            let font = FontFile::new(&bytes, 0)?;
            let family = font.name().and_then(|names| names.family_name());
            debug!("registered memory font \"{}\" ({:?})", name, family);
        }
        let mut state = self.shared.state.write();
        if state.lifecycle == AtlasState::Disposed {
            return Err(AtlasError::Disposed)
        }
        state.memory_fonts.insert(name.to_owned(), bytes);
        Ok(())
    }

    /// Tears the atlas down. Every later request fails with `AtlasError::Disposed`.
    pub fn dispose(&self) {
        {
            let mut state = self.shared.state.write();
            if state.lifecycle == AtlasState::Disposed {
                return
            }
            state.drop_fonts();
            state.pages.clear();
            state.marks = None;
            state.game_textures.clear();
            state.memory_fonts.clear();
            state.fallback_chain = None;
            state.lifecycle = AtlasState::Disposed;
        }
        self.shared.font_stack.lock().clear();
        self.shared.kerning.lock().clear();
        info!("disposed font atlas");
    }

    pub fn font_by_handle(&self, handle: NativeFontHandle) -> Option<FontHandle> {
        let state = self.shared.state.read();
        if let Some(&(ref font, ref users)) = state.by_handle.get(&handle) {
            return Some(FontHandle::new(font.clone(), Lease::new(users)))
        }
        match state.default_font {
            Some(ref font) if font.handle() == handle => Some(FontHandle::detached(font.clone())),
            _ => None,
        }
    }

    /// The font in the host toolkit's layout.
    pub fn native_font(&self, handle: NativeFontHandle) -> Option<NativeFont> {
        self.font_by_handle(handle).map(|font| NativeFont::from_font(&*font))
    }

    /// Drops loaded fonts that no task or handle refers to. Returns how many were dropped.
    /// Failed loads stay cached.
    pub fn release_unused(&self) -> usize {
        let mut guard = self.shared.state.write();
        let state = &mut *guard;

        // Chains go first: dropping one gives its members' leases back.
        let chains = take_unused(&mut state.chains);
        forget_handles(&mut state.by_handle, &chains);
        let count = chains.len();
        drop(chains);

        let fonts = take_unused(&mut state.fonts);
        forget_handles(&mut state.by_handle, &fonts);
        let count = count + fonts.len();
        drop(fonts);

        if count > 0 {
            debug!("released {} unused font(s)", count);
        }
        count
    }

    /// A font that only reserves line height, sized by the configured placeholder ratios.
    pub fn placeholder_font(&self, size_px: f32) -> FontHandle {
        let options = &self.shared.options;
        let font = PlaceholderFont::new(size_px,
                                        size_px * options.placeholder_ascent_ratio,
                                        size_px * options.placeholder_descent_ratio);
        FontHandle::detached(Arc::new(font))
    }

    pub fn shared_marks(&self) -> Option<SharedMarks> {
        self.shared.state.read().marks.clone()
    }

    /// Runs `f` with read access to the texture pages.
    pub fn with_pages<F, R>(&self, f: F) -> R where F: FnOnce(&PageSet) -> R {
        f(&self.shared.state.read().pages)
    }

    /// Packs a bitmap into a page. Used by fonts while they load.
    pub(crate) fn place_glyph(&self, bitmap: &GlyphBitmap) -> AtlasResult<Placement> {
        let mut guard = self.shared.state.write();
        let state = &mut *guard;
        match state.lifecycle {
            AtlasState::Disposed => return Err(AtlasError::Disposed),
            AtlasState::Empty => return Err(AtlasError::invalid("the atlas was cleared")),
            AtlasState::Built => {}
        }
        state.pages.place(bitmap, &state.gamma)
    }

    fn prepare(&self) -> AtlasResult<()> {
        let (lifecycle, gamma_changed) = {
            let state = self.shared.state.read();
            (state.lifecycle, state.gamma.differs_from(state.requested_gamma))
        };
        match lifecycle {
            AtlasState::Disposed => Err(AtlasError::Disposed),
            AtlasState::Empty => self.rebuild(),
            AtlasState::Built if gamma_changed => self.apply_gamma_change(),
            AtlasState::Built => Ok(()),
        }
    }

    fn apply_gamma_change(&self) -> AtlasResult<()> {
        let mut state = self.shared.state.write();
        let requested_gamma = state.requested_gamma;
        if state.lifecycle != AtlasState::Built || !state.gamma.differs_from(requested_gamma) {
            return Ok(())
        }
        info!("gamma changed from {} to {}", state.gamma.gamma(), state.requested_gamma);
        if !self.shared.options.rebuild_on_gamma_change {
            state.gamma = GammaTable::new(state.requested_gamma);
            return Ok(())
        }

        state.reset();
        drop(state);
        self.shared.font_stack.lock().clear();
        self.rebuild()
    }

    /// Lays out page 0 with the host toolkit's glyphs and the shared marks, then attaches the
    /// game textures that were attached before.
    fn rebuild(&self) -> AtlasResult<()> {
        let mut guard = self.shared.state.write();
        let state = &mut *guard;
        match state.lifecycle {
            AtlasState::Disposed => return Err(AtlasError::Disposed),
            AtlasState::Built => return Ok(()),
            AtlasState::Empty => {}
        }

        let page_size = state.pages.page_size();
        let padding = state.pages.padding();
        let bake = self.shared.services.host.bake_default_glyphs(page_size.width)?;
        if bake.alpha.len() != bake.size.width as usize * bake.size.height as usize {
            return Err(AtlasError::MalformedTableData(format!("default glyph bake of {}x{} \
                                                               has {} bytes",
                                                              bake.size.width,
                                                              bake.size.height,
                                                              bake.alpha.len())))
        }
        let marks_size = SharedMarks::size();
        let reserved_height = bake.size.height + padding + marks_size.height + padding;
        if bake.size.width > page_size.width || marks_size.width > page_size.width ||
                reserved_height > page_size.height {
            return Err(AtlasError::invalid(format!("default glyphs need {}x{} pixels of a {}x{} \
                                                    page",
                                                   bake.size.width.max(marks_size.width),
                                                   reserved_height,
                                                   page_size.width,
                                                   page_size.height)))
        }

        state.pages.clear();
        let mut page = TexturePage::with_reserved_top(page_size, padding, reserved_height);
        let texture_index = page::texture_index(0, DEFAULT_CONTENT_SLOT);
        let bake_rect = Rect::new(Point2D::zero(), bake.size);
        page.write_coverage(DEFAULT_CONTENT_SLOT, &bake_rect, &bake.alpha);
        let marks = SharedMarks::write(&mut page,
                                       texture_index,
                                       DEFAULT_CONTENT_SLOT,
                                       Point2D::new(0, bake.size.height + padding));
        state.pages.push(page)?;

        let glyphs = bake.glyphs.iter().map(|glyph| {
            baked_glyph_record(glyph, texture_index, page_size)
        });
        let default_font = BakedFont::new("host default", bake.metrics, glyphs, vec![]);
        state.default_font = Some(Arc::new(default_font));
        state.marks = Some(marks);

        state.game_textures.sort_by_key(|texture| texture.file_index);
        for texture in &mut state.game_textures {
            let page = TexturePage::external(texture.size, texture.pixels.clone())?;
            texture.page = state.pages.push(page)?;
        }

        state.gamma = GammaTable::new(state.requested_gamma);
        state.lifecycle = AtlasState::Built;
        info!("built font atlas with {} page(s) of {}x{}",
              state.pages.len(),
              page_size.width,
              page_size.height);
        Ok(())
    }

    fn font_job(&self,
                identifier: FontIdentifier,
                size_px: f32,
                users: Arc<AtomicUsize>,
                generation: u64)
                -> FontJob {
        let shared = Arc::downgrade(&self.shared);
        Box::new(move || {
            let atlas = FontAtlas::upgrade(&shared)?;
            let font = atlas.construct_font(&identifier, size_px).map_err(|error| {
                warn!("failed to load {} at {}px: {}", identifier, size_px, error);
                error
            })?;
            atlas.index_font(&font, users, generation);
            Ok(font)
        })
    }

    fn chain_job(&self, chain: FontChain, users: Arc<AtomicUsize>, generation: u64)
                 -> FontJob {
        let shared = Arc::downgrade(&self.shared);
        Box::new(move || {
            let atlas = FontAtlas::upgrade(&shared)?;
            let font: Arc<dyn PhysicalFont> = Arc::new(atlas.construct_chain(chain)?);
            atlas.index_font(&font, users, generation);
            Ok(font)
        })
    }

    fn upgrade(shared: &Weak<AtlasShared>) -> AtlasResult<FontAtlas> {
        match shared.upgrade() {
            Some(shared) => Ok(FontAtlas { shared }),
            None => Err(AtlasError::Disposed),
        }
    }

    fn index_font(&self, font: &Arc<dyn PhysicalFont>, users: Arc<AtomicUsize>, generation: u64) {
        let mut state = self.shared.state.write();
        if state.lifecycle == AtlasState::Disposed || state.generation != generation {
            debug!("not indexing a font queued before the caches were dropped");
            return
        }
        state.by_handle.insert(font.handle(), (font.clone(), users));
    }

    fn construct_font(&self, identifier: &FontIdentifier, size_px: f32)
                      -> AtlasResult<Arc<dyn PhysicalFont>> {
        match *identifier {
            FontIdentifier::Empty => Err(AtlasError::invalid("no font identifier given")),
            FontIdentifier::Bundled(BundledFont::HostDefault) => {
                let default = self.default_font()?;
                if ident::size_key(default.metrics().size_px) == ident::size_key(size_px) {
                    Ok(default.font().clone())
                } else {
                    Ok(Arc::new(RescaledFont::new(default, size_px)))
                }
            }
            FontIdentifier::Bundled(font) => {
                self.rasterized_font(identifier, &FaceSource::Bundled(font), size_px)
            }
            FontIdentifier::GameFamily(family) => {
                let baked = family.nearest_baked_size(size_px);
                if ident::size_key(baked.size_px()) == ident::size_key(size_px) {
                    return self.game_font(family, &baked)
                }
                let source = self.get_font(identifier, baked.size_px())?.wait()?;
                Ok(Arc::new(RescaledFont::new(source, size_px)))
            }
            FontIdentifier::SystemFamily { ref family, variant } => {
                let source = match self.memory_font_for_family(family) {
                    Some((name, bytes)) => FaceSource::Memory { name, bytes, index: 0 },
                    None => FaceSource::System { family: family.clone(), variant },
                };
                self.rasterized_font(identifier, &source, size_px)
            }
            FontIdentifier::File { ref path, index } => {
                let source = FaceSource::File { path: path.clone(), index };
                self.rasterized_font(identifier, &source, size_px)
            }
            FontIdentifier::NamedMemory { ref name, index } => {
                let bytes = self.shared.state.read().memory_fonts.get(name).cloned();
                let bytes = bytes.ok_or_else(|| {
                    AtlasError::not_found(format!("no memory font named \"{}\"", name))
                })?;
                let source = FaceSource::Memory { name: name.clone(), bytes, index };
                self.rasterized_font(identifier, &source, size_px)
            }
        }
    }

    fn rasterized_font(&self, identifier: &FontIdentifier, source: &FaceSource, size_px: f32)
                       -> AtlasResult<Arc<dyn PhysicalFont>> {
        let face = self.shared.services.engine.open_face(source)?;
        let kerning = self.kerning_for(identifier, &*face);
        debug!("opened {} at {}px ({} kerning pairs)",
               identifier,
               size_px,
               kerning.as_ref().map(|kerning| kerning.len()).unwrap_or(0));
        Ok(Arc::new(RasterizedFont::new(identifier.clone(), face, size_px, kerning)))
    }

    /// Kerning for a physical font, extracted once per identifier.
    fn kerning_for(&self, identifier: &FontIdentifier, face: &dyn FontFace)
                   -> Option<Arc<CodepointKerning>> {
        if let Some(kerning) = self.shared.kerning.lock().get(identifier) {
            return kerning.clone()
        }
        let kerning = face.font_data().and_then(|data| {
            match FontFile::new(&data, face.face_index()) {
                Ok(font) => kerning::extract_codepoint_kerning(&font).map(Arc::new),
                Err(error) => {
                    warn!("cannot read kerning of {}: {}", identifier, error);
                    None
                }
            }
        });
        self.shared.kerning.lock().insert(identifier.clone(), kerning.clone());
        kerning
    }

    fn memory_font_for_family(&self, family: &str) -> Option<(String, Arc<[u8]>)> {
        let state = self.shared.state.read();
        state.memory_fonts.iter().find(|&(_, bytes)| {
            let names = match FontFile::new(bytes, 0).ok().and_then(|font| font.name()) {
                Some(names) => names,
                None => return false,
            };
            let matches = |name: Option<String>| {
                name.map(|name| name.eq_ignore_ascii_case(family)).unwrap_or(false)
            };
            matches(names.family_name()) || matches(names.typographic_family_name())
        }).map(|(name, bytes)| (name.clone(), bytes.clone()))
    }

    fn game_font(&self, family: GameFontFamily, size: &BakedSize)
                 -> AtlasResult<Arc<dyn PhysicalFont>> {
        let services = &self.shared.services;
        let bytes = services.assets.fetch(&family.metrics_path(size))?;
        let data = services.bitmap_fonts.parse_metrics(&bytes)?;

        let mut textures: FxHashMap<u32, (usize, Size2D<u32>)> = FxHashMap::default();
        let mut glyphs = Vec::with_capacity(data.glyphs.len());
        for glyph in &data.glyphs {
            if glyph.channel >= page::CHANNEL_COUNT as u8 {
                return Err(AtlasError::MalformedTableData(format!("glyph U+{:04X} is in channel \
                                                                   {}",
                                                                  glyph.codepoint,
                                                                  glyph.channel)))
            }
            let (page_index, texture_size) = match textures.get(&glyph.texture) {
                Some(&texture) => texture,
                None => {
                    let texture = self.attach_game_texture(glyph.texture)?;
                    textures.insert(glyph.texture, texture);
                    texture
                }
            };
            let texture_index = page::texture_index(page_index, 1 + glyph.channel as u16);
            glyphs.push(baked_glyph_record(glyph, texture_index, texture_size));
        }

        let metrics = FontMetrics::new(size.size_px(), data.ascent, data.descent);
        let name = format!("{}_{}", family.file_stem(), size.suffix);
        Ok(Arc::new(BakedFont::new(&name, metrics, glyphs, data.kerning)))
    }

    /// Makes a game texture file a page, once. Returns the page and the texture's size.
    fn attach_game_texture(&self, file_index: u32) -> AtlasResult<(usize, Size2D<u32>)> {
        let attached = |state: &AtlasData| {
            state.game_textures
                 .iter()
                 .find(|texture| texture.file_index == file_index)
                 .map(|texture| (texture.page, texture.size))
        };
        if let Some(attached) = attached(&*self.shared.state.read()) {
            return Ok(attached)
        }

        let services = &self.shared.services;
        let bytes = services.assets.fetch(&ident::game_texture_path(file_index))?;
        let (size, pixels) = services.bitmap_fonts.decode_texture(&bytes)?;

        let mut state = self.shared.state.write();
        if let Some(attached) = attached(&*state) {
            return Ok(attached)
        }
        if state.lifecycle != AtlasState::Built {
            return Err(AtlasError::Disposed)
        }
        let page = state.pages.push(TexturePage::external(size, pixels.clone())?)?;
        state.game_textures.push(GameTexture { file_index, size, pixels, page });
        debug!("attached game texture {} as page {}", file_index, page);
        Ok((page, size))
    }

    /// Resolves every member. A chain whose primary font fails fails with every member error;
    /// failed secondary members are left out.
    fn construct_chain(&self, chain: FontChain) -> AtlasResult<ChainFont> {
        let mut members = vec![];
        let mut errors = vec![];
        for (index, entry) in chain.entries().enumerate() {
            let font = self.get_font(&entry.identifier, entry.size_px)
                           .and_then(|task| task.wait());
            match font {
                Ok(font) => members.push((entry.clone(), font)),
                Err(error) => {
                    warn!("chain member {} ({} at {}px) failed: {}",
                          index,
                          entry.identifier,
                          entry.size_px,
                          error);
                    errors.push(error);
                    if index == 0 {
                        break
                    }
                }
            }
        }
        if members.is_empty() {
            return Err(AtlasError::Aggregate(errors))
        }
        ChainFont::new(chain, members)
    }
}

fn take_unused<K>(map: &mut FxHashMap<K, CacheEntry>) -> Vec<CacheEntry>
                  where K: Clone + Eq + Hash {
    let keys: Vec<K> = map.iter()
                          .filter(|&(_, entry)| entry.is_unused())
                          .map(|(key, _)| key.clone())
                          .collect();
    keys.iter().filter_map(|key| map.remove(key)).collect()
}

fn forget_handles(by_handle: &mut HandleIndex, entries: &[CacheEntry]) {
    for entry in entries {
        if let Some(Ok(font)) = entry.slot.try_get() {
            by_handle.remove(&font.handle());
        }
    }
}

fn check_size(size_px: f32) -> AtlasResult<()> {
    if size_px > 0.0 && size_px.is_finite() {
        Ok(())
    } else {
        Err(AtlasError::invalid(format!("size {} is not positive", size_px)))
    }
}

/// Keeps a font current; see `FontAtlas::push_font_scoped`.
pub struct FontScope<'a> {
    atlas: &'a FontAtlas,
    depth: usize,
}

impl<'a> Drop for FontScope<'a> {
    fn drop(&mut self) {
        self.atlas.shared.font_stack.lock().truncate(self.depth);
    }
}

/// Holds back texture uploads; see `FontAtlas::suppress_texture_updates`.
pub struct SuppressTextureUpdates<'a> {
    atlas: &'a FontAtlas,
}

impl<'a> Drop for SuppressTextureUpdates<'a> {
    fn drop(&mut self) {
        if self.atlas.shared.suppress_count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.atlas.update_textures();
        }
    }
}
