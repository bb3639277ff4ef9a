use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Affine3A, Vec3};
use slotmap::SlotMap;

use crate::resources::{Geometry, GeometryKey, Material, MaterialKey, Mesh, Texture, TextureKey};
use crate::scene::camera::Camera;
use crate::scene::light::{AmbientLight, Light};
use crate::scene::node::Node;
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{CameraKey, LightKey, MeshKey, NodeHandle};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Number of live entries in each scene arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub nodes: usize,
    pub meshes: usize,
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
    pub cameras: usize,
    pub lights: usize,
}

impl ResourceCounts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Scene graph and resource arena.
///
/// `Scene` is a pure data container: nodes, their components and every CPU
/// resource (geometries, materials, textures) they reference. The renderer
/// keeps GPU copies keyed by [`Scene::id`] and drops them in
/// `Renderer::release_scene`, so disposing a scene is a single call on each
/// side rather than per-object cleanup.
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Components ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub lights: SlotMap<LightKey, Light>,

    // ==== Resources ====
    pub geometries: SlotMap<GeometryKey, Geometry>,
    pub materials: SlotMap<MaterialKey, Material>,
    pub textures: SlotMap<TextureKey, Texture>,

    pub ambient: AmbientLight,
    /// Clear color (linear RGB); the renderer default applies when `None`.
    pub background: Option<Vec3>,
    pub active_camera: Option<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),

            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),

            meshes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),

            geometries: SlotMap::with_key(),
            materials: SlotMap::with_key(),
            textures: SlotMap::with_key(),

            ambient: AmbientLight::default(),
            background: None,
            active_camera: None,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Starts building a node.
    pub fn build_node(&'_ mut self, name: impl Into<Cow<'static, str>>) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    /// Adds a node as a scene root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::warn!("Parent node not found, adding '{}' as a root", child.name);
            return self.add_node(child);
        }
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        handle
    }

    /// Moves `child` (with its subtree) under `parent`.
    ///
    /// Attaching a node to itself or to one of its own descendants is refused,
    /// which keeps the hierarchy acyclic.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::warn!("attach: unknown node handle");
            return;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("attach: parent is a descendant of the child, refusing to build a cycle");
            return;
        }

        self.detach_from_parent(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    /// Unlinks `handle` from its parent (or from the root list).
    fn detach_from_parent(&mut self, handle: NodeHandle) {
        let parent = self.nodes.get(handle).and_then(|n| n.parent);
        if let Some(p) = parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == handle)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == handle) {
            self.root_nodes.remove(i);
        }
        if let Some(n) = self.nodes.get_mut(handle) {
            n.parent = None;
        }
    }

    /// Whether `ancestor` appears on the parent chain of `node` (or is `node`).
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Removes a node and its whole subtree, including their components.
    ///
    /// Geometries, materials and textures may be shared between meshes and
    /// stay in the arena until [`Scene::dispose`].
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach_from_parent(handle);

        for h in self.descendants(handle) {
            let Some(node) = self.nodes.remove(h) else {
                continue;
            };
            if let Some(mesh) = node.mesh {
                self.meshes.remove(mesh);
            }
            if let Some(camera) = node.camera {
                self.cameras.remove(camera);
            }
            if let Some(light) = node.light {
                self.lights.remove(light);
            }
            if self.active_camera == Some(h) {
                self.active_camera = None;
            }
        }
    }

    /// `root` followed by every node below it, depth first.
    #[must_use]
    pub fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    pub fn set_visible(&mut self, handle: NodeHandle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.visible = visible;
        }
    }

    /// A node is visible in the world only if it and all its ancestors are.
    #[must_use]
    pub fn is_visible_in_world(&self, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            let Some(node) = self.nodes.get(h) else {
                return false;
            };
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    // ========================================================================
    // Resources
    // ========================================================================

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryKey {
        self.geometries.insert(geometry)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialKey {
        self.materials.insert(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureKey {
        self.textures.insert(texture)
    }

    /// Creates a root node that draws `geometry` with `material`.
    pub fn add_mesh(&mut self, geometry: GeometryKey, material: MaterialKey) -> NodeHandle {
        let mut node = Node::with_name("Mesh");
        node.mesh = Some(self.meshes.insert(Mesh::new(geometry, material)));
        self.add_node(node)
    }

    pub fn add_mesh_to_parent(
        &mut self,
        geometry: GeometryKey,
        material: MaterialKey,
        parent: NodeHandle,
    ) -> NodeHandle {
        let mut node = Node::with_name("Mesh");
        node.mesh = Some(self.meshes.insert(Mesh::new(geometry, material)));
        self.add_to_parent(node, parent)
    }

    pub fn add_camera(&mut self, camera: Camera) -> NodeHandle {
        let mut node = Node::with_name("Camera");
        node.camera = Some(self.cameras.insert(camera));
        self.add_node(node)
    }

    pub fn add_light(&mut self, light: Light) -> NodeHandle {
        let mut node = Node::with_name("Light");
        node.light = Some(self.lights.insert(light));
        self.add_node(node)
    }

    pub fn add_light_to_parent(&mut self, light: Light, parent: NodeHandle) -> NodeHandle {
        let mut node = Node::with_name("Light");
        node.light = Some(self.lights.insert(light));
        self.add_to_parent(node, parent)
    }

    /// Material of the mesh attached to `handle`.
    #[must_use]
    pub fn node_material(&self, handle: NodeHandle) -> Option<&Material> {
        let mesh = self.meshes.get(self.nodes.get(handle)?.mesh?)?;
        self.materials.get(mesh.material)
    }

    pub fn node_material_mut(&mut self, handle: NodeHandle) -> Option<&mut Material> {
        let mesh = self.meshes.get(self.nodes.get(handle)?.mesh?)?;
        self.materials.get_mut(mesh.material)
    }

    pub fn node_light_mut(&mut self, handle: NodeHandle) -> Option<&mut Light> {
        let key = self.nodes.get(handle)?.light?;
        self.lights.get_mut(key)
    }

    /// Geometry and world matrix of the mesh attached to `handle`.
    #[must_use]
    pub fn node_geometry(&self, handle: NodeHandle) -> Option<(&Geometry, &Mesh)> {
        let mesh = self.meshes.get(self.nodes.get(handle)?.mesh?)?;
        Some((self.geometries.get(mesh.geometry)?, mesh))
    }

    // ========================================================================
    // Component queries
    // ========================================================================

    /// Every light on a visible node, with its node's world matrix.
    pub fn iter_active_lights(&self) -> impl Iterator<Item = (&Light, &Affine3A)> {
        self.nodes.iter().filter_map(move |(handle, node)| {
            let light = self.lights.get(node.light?)?;
            if !self.is_visible_in_world(handle) {
                return None;
            }
            Some((light, &node.transform.world_matrix))
        })
    }

    pub fn query_main_camera_bundle(&mut self) -> Option<(&mut Transform, &mut Camera)> {
        let node_id = self.active_camera?;
        let camera_key = self.nodes.get(node_id)?.camera?;
        let camera = self.cameras.get_mut(camera_key)?;
        let transform = &mut self.nodes.get_mut(node_id)?.transform;
        Some((transform, camera))
    }

    #[must_use]
    pub fn main_camera(&self) -> Option<&Camera> {
        let key = self.nodes.get(self.active_camera?)?.camera?;
        self.cameras.get(key)
    }

    pub fn main_camera_mut(&mut self) -> Option<&mut Camera> {
        let key = self.nodes.get(self.active_camera?)?.camera?;
        self.cameras.get_mut(key)
    }

    // ========================================================================
    // Matrix update pipeline
    // ========================================================================

    /// Refreshes every world matrix. Run once per frame before drawing or
    /// picking.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &mut self.cameras, &self.root_nodes);
    }

    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        self.nodes.get(handle).map(|n| n.transform.world_matrix)
    }

    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(|n| n.transform.world_position())
    }

    // ========================================================================
    // Lifetime
    // ========================================================================

    #[must_use]
    pub fn resource_counts(&self) -> ResourceCounts {
        ResourceCounts {
            nodes: self.nodes.len(),
            meshes: self.meshes.len(),
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
            cameras: self.cameras.len(),
            lights: self.lights.len(),
        }
    }

    /// Drops every node and resource. Returns what was released.
    pub fn dispose(&mut self) -> ResourceCounts {
        let released = self.resource_counts();
        self.nodes.clear();
        self.root_nodes.clear();
        self.meshes.clear();
        self.cameras.clear();
        self.lights.clear();
        self.geometries.clear();
        self.materials.clear();
        self.textures.clear();
        self.active_camera = None;
        log::debug!("Scene {} disposed: {released:?}", self.id);
        released
    }
}

/// Fluent node construction.
///
/// ```rust,ignore
/// let flame = scene
///     .build_node("Flame")
///     .with_position(Vec3::new(0.0, 0.9, 0.0))
///     .with_mesh(geometry, material)
///     .with_parent(candle)
///     .build();
/// ```
pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    mesh: Option<Mesh>,
    parent: Option<NodeHandle>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            scene,
            node: Node::with_name(name),
            mesh: None,
            parent: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.node.transform.position = position;
        self
    }

    /// XYZ Euler angles in radians.
    #[must_use]
    pub fn with_rotation_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.set_rotation_euler(x, y, z);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.node.transform.scale = scale;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.node.visible = visible;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, geometry: GeometryKey, material: MaterialKey) -> Self {
        self.mesh = Some(Mesh::new(geometry, material));
        self
    }

    #[must_use]
    pub fn with_render_order(mut self, order: i32) -> Self {
        if let Some(mesh) = &mut self.mesh {
            mesh.render_order = order;
        }
        self
    }

    #[must_use]
    pub fn with_light(mut self, light: Light) -> Self {
        self.node.light = Some(self.scene.lights.insert(light));
        self
    }

    /// Inserts the node into the scene and returns its handle.
    pub fn build(mut self) -> NodeHandle {
        if let Some(mesh) = self.mesh.take() {
            self.node.mesh = Some(self.scene.meshes.insert(mesh));
        }
        match self.parent {
            Some(parent) => self.scene.add_to_parent(self.node, parent),
            None => self.scene.add_node(self.node),
        }
    }
}
